mod ansi;
mod select;
mod template;

pub use self::ansi::AnsiQueries;
pub use self::select::SelectBuilder;
pub use self::template::QueryTemplate;
