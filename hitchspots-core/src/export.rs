//! Naming of exported trip files.

/// File name for a country export: the lowercased country name with every
/// character outside `a-z` replaced by `_`, followed by `.{extension}`.
///
/// ```
/// use hitchspots_core::export::export_file_name;
///
/// assert_eq!(
///     export_file_name("Bosnia and Herzegovina", "kml"),
///     "bosnia_and_herzegovina.kml"
/// );
/// ```
#[must_use]
pub fn export_file_name(country: &str, extension: &str) -> String {
    let stem: String = country
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_ascii_lowercase() { c } else { '_' })
        .collect();
    format!("{stem}.{extension}")
}
