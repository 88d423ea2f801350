use anyhow::{bail, Result};

use crate::layout::Architecture;

const ARCHITECTURE_PLACEHOLDER: &str = "{architecture}";

/// A third-party dependency and the shared libraries its build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryDescriptor {
    /// Package name; also names the library's build output directory.
    pub name: &'static str,
    /// File names of the produced DLLs, optionally containing `{architecture}`.
    pub dll_templates: &'static [&'static str],
}

impl LibraryDescriptor {
    /// DLL file names with the architecture substituted, in declaration order.
    pub fn dll_names(&self, architecture: Architecture) -> Result<Vec<String>> {
        self.dll_templates
            .iter()
            .map(|template| resolve_template(template, architecture))
            .collect()
    }
}

/// Libraries distributed to every module by `updateLibs`.
pub const LIBRARIES: &[LibraryDescriptor] = &[
    LibraryDescriptor {
        name: "PhysX",
        dll_templates: &[
            "PhysXCommon_{architecture}.dll",
            "PhysX_{architecture}.dll",
            "PhysXFoundation_{architecture}.dll",
            "PhysXCooking_{architecture}.dll",
            "PhysXGpu_{architecture}.dll",
        ],
    },
    LibraryDescriptor {
        name: "GameNetworkingSockets",
        dll_templates: &["GameNetworkingSockets.dll"],
    },
    LibraryDescriptor {
        name: "OpenSSL",
        dll_templates: &[
            "libssl-1_1-x{architecture}.dll",
            "libcrypto-1_1-x{architecture}.dll",
            "libprotobufd.dll",
        ],
    },
];

/// Substitutes `{architecture}` in a DLL file name template.
pub fn resolve_template(template: &str, architecture: Architecture) -> Result<String> {
    let resolved = template.replace(ARCHITECTURE_PLACEHOLDER, architecture.bits());
    if resolved.contains(['{', '}']) {
        bail!("Unsupported placeholder in library file template '{template}'");
    }
    Ok(resolved)
}
