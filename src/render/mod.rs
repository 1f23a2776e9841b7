mod formatter;

pub use formatter::ConditionFormatter;
