//! Resource error types.

use thiserror::Error;

use crate::shader::ShaderMemberKind;

/// Errors raised while building or registering resources.
///
/// These surface configuration mistakes (a material that does not match its
/// shader's member layout, a dangling texture reference) when a resource is
/// created or registered, so the renderer never has to deal with them in the
/// middle of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The shader layout has no member with this name.
    #[error("shader `{shader}` has no member named `{member}`")]
    UnknownMember {
        /// Shader name.
        shader: String,
        /// Requested member name.
        member: String,
    },
    /// A value of the wrong kind was written to a member.
    #[error("member `{member}` is {expected:?}, got {actual:?}")]
    TypeMismatch {
        /// Member name.
        member: String,
        /// Kind declared by the shader layout.
        expected: ShaderMemberKind,
        /// Kind of the value that was supplied.
        actual: ShaderMemberKind,
    },
    /// A member's raw bytes lie outside the material's data blob.
    #[error("member `{member}` needs bytes {offset}..{end} but material data is {len} bytes")]
    MemberOutOfRange {
        /// Member name.
        member: String,
        /// Start offset in the material data.
        offset: usize,
        /// End offset in the material data.
        end: usize,
        /// Length of the material data.
        len: usize,
    },
    /// A material references a shader that is not registered.
    #[error("unknown shader {0}")]
    UnknownShader(u32),
    /// A material references a texture that is not registered.
    #[error("member `{member}` references unknown texture {texture}")]
    UnknownTexture {
        /// Member name.
        member: String,
        /// Texture id stored in the material data.
        texture: u64,
    },
    /// A shader declares the same member twice.
    #[error("shader `{shader}` declares member `{member}` more than once")]
    DuplicateMember {
        /// Shader name.
        shader: String,
        /// Member name.
        member: String,
    },
}
