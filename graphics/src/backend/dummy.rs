//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't talk to a GPU. It keeps real byte storage for every
//! buffer and records every state change and draw, so tests can inspect
//! exactly what the renderer would have sent. Fences are simulated: see
//! [`FenceMode`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use crate::types::{BufferDescriptor, DrawIndexedIndirectArgs};

use super::{
    BackendError, BufferHandle, BuiltinProgram, FenceHandle, FenceWait, GeometryBinding,
    GpuBackend, Program, UniformValue,
};

/// How the dummy backend simulates GPU progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FenceMode {
    /// Every fence is signaled as soon as it is created.
    #[default]
    Immediate,
    /// New fences stay unsignaled until [`DummyBackend::signal_fence`] or
    /// [`DummyBackend::signal_all_fences`] is called. Waits on them time out.
    Manual,
    /// New fences become signaled after this many waits on them.
    AfterWaits(u32),
}

#[derive(Debug)]
struct DummyBuffer {
    descriptor: BufferDescriptor,
    data: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
struct DummyFence {
    signaled: bool,
    waits_remaining: Option<u32>,
}

/// A recorded sub-range upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    /// Target buffer.
    pub buffer: BufferHandle,
    /// Byte offset.
    pub offset: u64,
    /// Byte size.
    pub size: u64,
}

/// A recorded multi-draw, with the state it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// Program bound at draw time.
    pub program: Option<Program>,
    /// Geometry bound at draw time.
    pub geometry: Option<GeometryBinding>,
    /// Storage-buffer ranges bound at draw time, keyed by binding point.
    pub storage: HashMap<u32, (BufferHandle, u64, u64)>,
    /// Indirect buffer.
    pub indirect: BufferHandle,
    /// Byte offset of the first command.
    pub offset: u64,
    /// Number of draws.
    pub draw_count: u32,
    /// Commands as read back from the indirect buffer's memory.
    pub commands: Vec<DrawIndexedIndirectArgs>,
}

impl DrawRecord {
    /// Sum of `instance_count` across all commands.
    pub fn instance_total(&self) -> u32 {
        self.commands.iter().map(|c| c.instance_count).sum()
    }
}

/// Dummy GPU backend.
#[derive(Debug)]
pub struct DummyBackend {
    storage_alignment: u64,
    fence_mode: FenceMode,
    next_id: u64,
    buffers: HashMap<u64, DummyBuffer>,
    fences: HashMap<u64, DummyFence>,
    scripted_waits: VecDeque<FenceWait>,
    loaded_programs: Vec<BuiltinProgram>,
    bound_program: Option<Program>,
    bound_geometry: Option<GeometryBinding>,
    storage: HashMap<u32, (BufferHandle, u64, u64)>,
    uniforms: HashMap<String, UniformValue>,
    resident: HashSet<u64>,
    uploads: Vec<UploadRecord>,
    draws: Vec<DrawRecord>,
    fence_waits: Vec<(FenceHandle, bool, FenceWait)>,
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyBackend {
    /// Create a dummy backend with 256-byte storage alignment and
    /// immediately signaled fences.
    pub fn new() -> Self {
        Self {
            storage_alignment: 256,
            fence_mode: FenceMode::Immediate,
            next_id: 1,
            buffers: HashMap::new(),
            fences: HashMap::new(),
            scripted_waits: VecDeque::new(),
            loaded_programs: Vec::new(),
            bound_program: None,
            bound_geometry: None,
            storage: HashMap::new(),
            uniforms: HashMap::new(),
            resident: HashSet::new(),
            uploads: Vec::new(),
            draws: Vec::new(),
            fence_waits: Vec::new(),
        }
    }

    /// Set the reported storage-buffer offset alignment.
    #[must_use]
    pub fn with_storage_alignment(mut self, alignment: u64) -> Self {
        self.storage_alignment = alignment.max(1);
        self
    }

    /// Set how fences are simulated.
    #[must_use]
    pub fn with_fence_mode(mut self, mode: FenceMode) -> Self {
        self.fence_mode = mode;
        self
    }

    /// Change how fences created from now on are simulated.
    pub fn set_fence_mode(&mut self, mode: FenceMode) {
        self.fence_mode = mode;
    }

    /// Force the results of the next fence waits, in order.
    pub fn script_fence_waits(&mut self, results: impl IntoIterator<Item = FenceWait>) {
        self.scripted_waits.extend(results);
    }

    /// Signal one fence, as if the GPU reached it.
    pub fn signal_fence(&mut self, fence: FenceHandle) {
        if let Some(state) = self.fences.get_mut(&fence.0) {
            state.signaled = true;
        }
    }

    /// Signal every live fence.
    pub fn signal_all_fences(&mut self) {
        for state in self.fences.values_mut() {
            state.signaled = true;
        }
    }

    /// Whether a fence is signaled. Unknown fences report `false`.
    pub fn is_fence_signaled(&self, fence: FenceHandle) -> bool {
        self.fences.get(&fence.0).is_some_and(|f| f.signaled)
    }

    /// Number of live fences.
    pub fn fence_count(&self) -> usize {
        self.fences.len()
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Raw contents of a buffer.
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer.0).map(|b| b.data.as_slice())
    }

    /// Descriptor a buffer was created with.
    pub fn buffer_descriptor(&self, buffer: BufferHandle) -> Option<&BufferDescriptor> {
        self.buffers.get(&buffer.0).map(|b| &b.descriptor)
    }

    /// Built-in programs loaded so far.
    pub fn loaded_programs(&self) -> &[BuiltinProgram] {
        &self.loaded_programs
    }

    /// Last value set for a uniform.
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    /// Whether a bindless handle has been made resident.
    pub fn is_resident(&self, handle: u64) -> bool {
        self.resident.contains(&handle)
    }

    /// Sub-range uploads issued so far.
    pub fn uploads(&self) -> &[UploadRecord] {
        &self.uploads
    }

    /// Multi-draws issued so far.
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Fence waits issued so far: fence, flush flag, result.
    pub fn fence_waits(&self) -> &[(FenceHandle, bool, FenceWait)] {
        &self.fence_waits
    }

    /// Forget recorded uploads, draws and fence waits.
    pub fn clear_records(&mut self) {
        self.uploads.clear();
        self.draws.clear();
        self.fence_waits.clear();
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert_fence(&mut self, signaled: bool) -> FenceHandle {
        let id = self.allocate_id();
        let waits_remaining = match self.fence_mode {
            FenceMode::AfterWaits(n) if !signaled => Some(n),
            _ => None,
        };
        self.fences.insert(
            id,
            DummyFence {
                signaled,
                waits_remaining,
            },
        );
        FenceHandle(id)
    }

    fn read_commands(
        &self,
        buffer: BufferHandle,
        offset: u64,
        count: u32,
        stride: u32,
    ) -> Vec<DrawIndexedIndirectArgs> {
        let Some(data) = self.buffers.get(&buffer.0).map(|b| &b.data) else {
            return Vec::new();
        };
        (0..u64::from(count))
            .filter_map(|i| {
                let start = (offset + i * u64::from(stride)) as usize;
                let end = start + DrawIndexedIndirectArgs::SIZE as usize;
                data.get(start..end)
                    .map(bytemuck::pod_read_unaligned::<DrawIndexedIndirectArgs>)
            })
            .collect()
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &str {
        "Dummy Backend"
    }

    fn min_storage_buffer_offset_alignment(&self) -> u64 {
        self.storage_alignment
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
    ) -> Result<BufferHandle, BackendError> {
        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {}, usage: {:?})",
            descriptor.label,
            descriptor.size,
            descriptor.usage
        );
        let size = usize::try_from(descriptor.size).map_err(|_| BackendError::OutOfMemory)?;
        let id = self.allocate_id();
        self.buffers.insert(
            id,
            DummyBuffer {
                descriptor: descriptor.clone(),
                data: vec![0; size],
            },
        );
        Ok(BufferHandle(id))
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        log::trace!("DummyBackend: destroying buffer {}", buffer.0);
        self.buffers.remove(&buffer.0);
    }

    fn upload(
        &mut self,
        buffer: BufferHandle,
        offset: u64,
        data: &[u8],
    ) -> Result<(), BackendError> {
        let target = self
            .buffers
            .get_mut(&buffer.0)
            .ok_or(BackendError::UnknownBuffer(buffer))?;
        let size = data.len() as u64;
        let buffer_size = target.data.len() as u64;
        if offset + size > buffer_size {
            return Err(BackendError::OutOfBounds {
                offset,
                size,
                buffer_size,
            });
        }
        let start = offset as usize;
        target.data[start..start + data.len()].copy_from_slice(data);
        self.uploads.push(UploadRecord {
            buffer,
            offset,
            size,
        });
        Ok(())
    }

    fn mapped_mut(&mut self, buffer: BufferHandle) -> Result<&mut [u8], BackendError> {
        let target = self
            .buffers
            .get_mut(&buffer.0)
            .ok_or(BackendError::UnknownBuffer(buffer))?;
        if !target.descriptor.is_persistent() {
            return Err(BackendError::NotMapped(buffer));
        }
        Ok(&mut target.data)
    }

    fn create_fence(&mut self) -> Result<FenceHandle, BackendError> {
        let signaled = self.fence_mode == FenceMode::Immediate;
        Ok(self.insert_fence(signaled))
    }

    fn create_signaled_fence(&mut self) -> Result<FenceHandle, BackendError> {
        Ok(self.insert_fence(true))
    }

    fn wait_fence(&mut self, fence: FenceHandle, flush: bool, timeout: Duration) -> FenceWait {
        let result = if let Some(scripted) = self.scripted_waits.pop_front() {
            scripted
        } else {
            match self.fences.get_mut(&fence.0) {
                None => FenceWait::Failed,
                Some(state) if state.signaled => FenceWait::Signaled,
                Some(state) => match state.waits_remaining.as_mut() {
                    Some(0) => {
                        state.signaled = true;
                        FenceWait::Signaled
                    }
                    Some(remaining) => {
                        *remaining -= 1;
                        FenceWait::TimedOut
                    }
                    None => FenceWait::TimedOut,
                },
            }
        };
        log::trace!(
            "DummyBackend: wait on fence {} (flush: {}, timeout: {:?}) -> {:?}",
            fence.0,
            flush,
            timeout,
            result
        );
        self.fence_waits.push((fence, flush, result));
        result
    }

    fn destroy_fence(&mut self, fence: FenceHandle) {
        self.fences.remove(&fence.0);
    }

    fn load_builtin_program(&mut self, program: BuiltinProgram) -> Result<(), BackendError> {
        log::trace!("DummyBackend: loading built-in program {:?}", program);
        if !self.loaded_programs.contains(&program) {
            self.loaded_programs.push(program);
        }
        Ok(())
    }

    fn bind_program(&mut self, program: Program) {
        self.bound_program = Some(program);
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_string(), value);
    }

    fn bind_storage_range(&mut self, binding: u32, buffer: BufferHandle, offset: u64, size: u64) {
        self.storage.insert(binding, (buffer, offset, size));
    }

    fn bind_geometry(&mut self, geometry: &GeometryBinding) {
        self.bound_geometry = Some(*geometry);
    }

    fn multi_draw_indexed_indirect(
        &mut self,
        indirect: BufferHandle,
        offset: u64,
        draw_count: u32,
        stride: u32,
    ) {
        log::trace!(
            "DummyBackend: multi-draw {} commands from buffer {} at offset {}",
            draw_count,
            indirect.0,
            offset
        );
        let commands = self.read_commands(indirect, offset, draw_count, stride);
        self.draws.push(DrawRecord {
            program: self.bound_program,
            geometry: self.bound_geometry,
            storage: self.storage.clone(),
            indirect,
            offset,
            draw_count,
            commands,
        });
    }

    fn make_texture_resident(&mut self, handle: u64) {
        self.resident.insert(handle);
    }
}
