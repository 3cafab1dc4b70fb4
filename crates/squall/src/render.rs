//! The rendering contract shared by every SQL-visible object.

use crate::dialect::{AnsiDialect, Dialect};

/// Pure conversion of an object into SQL text.
pub trait SqlRender {
    /// Render for a specific backend.
    fn render_with(&self, dialect: &dyn Dialect) -> String;

    /// Render with backend-neutral rules.
    fn render(&self) -> String {
        self.render_with(&AnsiDialect)
    }
}

/// Implement `Display` in terms of [`SqlRender::render`].
macro_rules! display_via_render {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ::std::fmt::Display for $ty {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    f.write_str(&$crate::render::SqlRender::render(self))
                }
            }
        )+
    };
}

pub(crate) use display_via_render;

/// Join already-rendered parts with single spaces, skipping empty ones.
pub(crate) fn join_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
