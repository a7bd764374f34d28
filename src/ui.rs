/// write a formatted line to `$stream`, coloured with `$color` (a `Colorize` method)
#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($stream:ident, $color:ident, $fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::$stream(), "{}", format!($fmt $(, $($arg)*)?).$color());
    }};
    ($stream:ident, $color:ident, $expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::$stream(), "{}", format!("{}", $expr).$color());
    }};
}

/// yellow, to stderr
#[macro_export]
macro_rules! warning {
    ($($tt:tt)+) => {
        $crate::__log_line!(stderr, yellow, $($tt)+)
    };
}

/// red, to stderr
#[macro_export]
macro_rules! error {
    ($($tt:tt)+) => {
        $crate::__log_line!(stderr, red, $($tt)+)
    };
}

/// green, to stdout
#[macro_export]
macro_rules! status {
    ($($tt:tt)+) => {
        $crate::__log_line!(stdout, green, $($tt)+)
    };
}

/// uncoloured, to stdout
#[macro_export]
macro_rules! info {
    () => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout());
    }};
    ($($tt:tt)+) => {
        $crate::__log_line!(stdout, normal, $($tt)+)
    };
}

/// "yes"/"no" for status output
pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// a dimmed label followed by its value, for aligned key/value output
pub fn field(label: &str, value: impl std::fmt::Display) {
    info!("  {} {}", format!("{label:<14}").dimmed(), value);
}
