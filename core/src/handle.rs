//! Typed resource handles.
//!
//! Handles are small copyable ids issued by the
//! [`ResourceManager`](crate::resources::ResourceManager). They carry no
//! lifetime; looking up a handle from another manager simply fails.

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Create a handle from a raw index.
            pub fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw index.
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_handle!(
    /// Handle to a registered [`Shader`](crate::shader::Shader).
    ShaderId
);
define_handle!(
    /// Handle to a registered [`Material`](crate::material::Material).
    MaterialId
);
define_handle!(
    /// Handle to a registered [`Texture`](crate::texture::Texture).
    TextureId
);
define_handle!(
    /// Handle to a registered [`Font`](crate::font::Font).
    FontId
);
define_handle!(
    /// Handle to a registered [`HdrCubemap`](crate::texture::HdrCubemap).
    CubemapId
);
