/// Configuration macros for zero-repetition config definitions
///
/// `config_struct!` declares field name, type and default value in one place
/// and generates:
/// - the struct with public fields
/// - the `Default` implementation
/// - serde support with `#[serde(default)]`, so partial TOML files work
///
/// # Example
/// ```
/// crypto_volume::config_struct! {
///     pub struct ExampleConfig {
///         timeout_seconds: u64 = 10,
///         enabled: bool = true,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
