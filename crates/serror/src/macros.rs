/// Construct a [`StructuredError`](crate::StructuredError) with the call
/// site recorded as its stack line.
///
/// # Forms
///
/// ```ignore
/// // Kind only
/// serr!("NotFound")
///
/// // Kind with a formatted message
/// serr!("NotFound", "user {} missing", id)
/// ```
///
/// The result is an ordinary builder value, so the chain continues:
///
/// ```ignore
/// serr!("Validation", "bad input").with_status(400).with_meta("field", "email")
/// ```
#[macro_export]
macro_rules! serr {
    ($kind:expr) => {
        $crate::StructuredError::new($kind)
            .with_location(file!(), line!(), module_path!())
    };

    ($kind:expr, $($fmt:tt)+) => {
        $crate::StructuredError::new($kind)
            .with_location(file!(), line!(), module_path!())
            .with_message(format!($($fmt)+))
    };
}
