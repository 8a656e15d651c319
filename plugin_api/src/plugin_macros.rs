/// Declares the library entry point returning the plugin's capability table.
///
/// The argument must be a constant expression of type `SourcePluginInfo`:
///
/// ```ignore
/// plugin_api::declare_source_plugin!(plugin_api::SourcePluginInfo {
///     get_id: Some(get_id),
///     get_name: Some(get_name),
///     // ...
///     ..plugin_api::SourcePluginInfo::empty()
/// });
/// ```
#[macro_export]
macro_rules! declare_source_plugin {
    ($info:expr) => {
        #[no_mangle]
        pub extern "C" fn get_source_plugin_info() -> *const $crate::SourcePluginInfo {
            static INFO: $crate::SourcePluginInfo = $info;
            &INFO
        }
    };
}
