//! The standard bundle information document.
//!
//! `Info` resolves read-only from the bundle directories, so edits made
//! through [`InfoPlist`] live only as long as the model.

use plist_model_value::{Dictionary, Value};

use crate::locator::{DocumentLocator, INFO_DOCUMENT_NAME};
use crate::model::DocumentModel;

crate::plist_model! {
    /// Well-known keys of a bundle's `Info` document.
    pub struct InfoPlist {
        /// Localization native development region.
        development_region: String = "CFBundleDevelopmentRegion",
        display_name: String = "CFBundleDisplayName",
        executable: String = "CFBundleExecutable",
        identifier: String = "CFBundleIdentifier",
        info_dictionary_version: String = "CFBundleInfoDictionaryVersion",
        bundle_name: String = "CFBundleName",
        /// Bundle OS type code.
        package_type: String = "CFBundlePackageType",
        short_version_string: String = "CFBundleShortVersionString",
        /// Bundle creator OS type code.
        signature: String = "CFBundleSignature",
        version: String = "CFBundleVersion",
        requires_iphone_os: bool = "LSRequiresIPhoneOS",
        main_storyboard_file: String = "UIMainStoryboardFile",
        required_device_capabilities: Vec<Value> = "UIRequiredDeviceCapabilities",
        supported_interface_orientations: Vec<Value> = "UISupportedInterfaceOrientations",
        platform_name: String = "DTPlatformName",
        supported_platforms: Vec<Value> = "CFBundleSupportedPlatforms",
        sdk_name: String = "DTSDKName",
        device_family: Vec<Value> = "UIDeviceFamily",
        /// Raw launch image dictionaries; see [`InfoPlist::launch_images`].
        launch_image_entries: Vec<Value> = "UILaunchImages",
    }
}

impl InfoPlist {
    /// Load `Info` through `locator`. Without a bundled copy the result is
    /// empty and detached.
    pub fn load_bundled(locator: &dyn DocumentLocator) -> Self {
        Self::load(INFO_DOCUMENT_NAME, locator)
    }

    /// Launch images, skipping entries that aren't dictionaries.
    pub fn launch_images(&self) -> Vec<LaunchImage> {
        self.launch_image_entries()
            .iter()
            .filter_map(Value::as_dictionary)
            .map(LaunchImage::from_dictionary)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchImage {
    pub minimum_os_version: String,
    pub name: String,
    pub orientation: String,
    /// As stored, e.g. `{320, 568}`.
    pub size: String,
}

impl LaunchImage {
    pub fn from_dictionary(entry: &Dictionary) -> Self {
        let text = |key: &str| {
            entry
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            minimum_os_version: text("UILaunchImageMinimumOSVersion"),
            name: text("UILaunchImageName"),
            orientation: text("UILaunchImageOrientation"),
            size: text("UILaunchImageSize"),
        }
    }
}
