/// Configuration options for the preprocessor.
///
/// # Default
///
/// All options default to `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreprocessorOptions {
    /// Whether `$(name)` references in a `:setvar` value are expanded
    /// against the current variable table before the value is stored.
    ///
    /// When `false`, values are stored verbatim and any references they
    /// contain are substituted only where the variable is later used.
    ///
    /// # Default
    ///
    /// `false`
    pub variable_replacement_in_setvar: bool,
}
