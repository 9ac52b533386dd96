//! Headless backend that records GPU commands and tracks live handles.
//!
//! Useful for hosts without a GPU and for checking the manager's draw
//! protocol: every command the manager issues is appended to a log, and
//! alive/released handle sets show exactly what the manager owns.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::backend::{GpuBackend, Location};
use crate::interface::ShaderLocations;
use crate::matrix::Mat4;

/// Description of a program as the host "linked" it.
#[derive(Debug, Clone, Default)]
pub struct ProgramDesc {
    link_log: Option<String>,
    prepare_error: Option<String>,
    uniforms: HashMap<String, Location>,
    attributes: HashMap<String, Location>,
}

impl ProgramDesc {
    /// A successfully linked program with no interface yet.
    pub fn linked() -> Self {
        Self::default()
    }

    /// A program whose link failed with `log`.
    pub fn unlinked(log: impl Into<String>) -> Self {
        Self {
            link_log: Some(log.into()),
            ..Self::default()
        }
    }

    pub fn uniform(mut self, name: &str, location: Location) -> Self {
        self.uniforms.insert(name.to_string(), location);
        self
    }

    pub fn attribute(mut self, name: &str, location: Location) -> Self {
        self.attributes.insert(name.to_string(), location);
        self
    }

    /// Make `prepare_program` fail for this program.
    pub fn failing_prepare(mut self, message: impl Into<String>) -> Self {
        self.prepare_error = Some(message.into());
        self
    }
}

/// Program handle issued by [`RecordingBackend::create_program`].
#[derive(Debug, PartialEq, Eq)]
pub struct ProgramHandle(u32);

/// Texture handle issued by [`RecordingBackend::create_texture`].
#[derive(Debug, PartialEq, Eq)]
pub struct TextureHandle(u32);

/// Instance buffer handle.
#[derive(Debug, PartialEq, Eq)]
pub struct BufferHandle {
    id: u32,
    size: u64,
}

impl ProgramHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl TextureHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl BufferHandle {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    PrepareProgram { program: u32 },
    ReleaseProgram(u32),
    ReleaseTexture(u32),
    CreateBuffer { buffer: u32, size: u64 },
    ReleaseBuffer(u32),
    BindProgram(u32),
    BindTexture { unit: u32, texture: u32 },
    SetUniformMatrix { location: Location, matrix: Mat4 },
    UploadInstances { buffer: u32, bytes: Vec<u8> },
    DrawQuadInstanced { buffer: u32, instance_count: u32 },
}

#[derive(Debug, Default)]
struct RecordingState {
    next_id: u32,
    programs: HashMap<u32, ProgramDesc>,
    textures: BTreeSet<u32>,
    buffers: BTreeSet<u32>,
    released_programs: Vec<u32>,
    released_textures: Vec<u32>,
    released_buffers: Vec<u32>,
    commands: Vec<GpuCommand>,
    max_buffer_size: Option<u64>,
    upload_error: Option<String>,
}

impl RecordingState {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Command-recording [`GpuBackend`].
///
/// Clones share the same state, so a test can keep a clone while a
/// manager owns the backend, and inspect it after the manager is dropped.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_program(&self, desc: ProgramDesc) -> ProgramHandle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.programs.insert(id, desc);
        ProgramHandle(id)
    }

    pub fn create_texture(&self) -> TextureHandle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.textures.insert(id);
        TextureHandle(id)
    }

    /// Reject instance buffers larger than `size` bytes.
    pub fn set_max_buffer_size(&self, size: Option<u64>) {
        self.state.borrow_mut().max_buffer_size = size;
    }

    /// Make every upload fail with `error` until cleared with `None`.
    pub fn set_upload_error(&self, error: Option<String>) {
        self.state.borrow_mut().upload_error = error;
    }

    pub fn commands(&self) -> Vec<GpuCommand> {
        self.state.borrow().commands.clone()
    }

    /// Return and clear the command log.
    pub fn take_commands(&self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.state.borrow_mut().commands)
    }

    /// Instance counts of every recorded instanced draw.
    pub fn draw_calls(&self) -> Vec<u32> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                GpuCommand::DrawQuadInstanced { instance_count, .. } => Some(*instance_count),
                _ => None,
            })
            .collect()
    }

    /// Payloads of every recorded instance upload.
    pub fn uploads(&self) -> Vec<Vec<u8>> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                GpuCommand::UploadInstances { bytes, .. } => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn alive_programs(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.state.borrow().programs.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn alive_textures(&self) -> Vec<u32> {
        self.state.borrow().textures.iter().copied().collect()
    }

    pub fn alive_buffers(&self) -> Vec<u32> {
        self.state.borrow().buffers.iter().copied().collect()
    }

    pub fn released_programs(&self) -> Vec<u32> {
        self.state.borrow().released_programs.clone()
    }

    pub fn released_textures(&self) -> Vec<u32> {
        self.state.borrow().released_textures.clone()
    }

    pub fn released_buffers(&self) -> Vec<u32> {
        self.state.borrow().released_buffers.clone()
    }

    fn record(&self, command: GpuCommand) {
        self.state.borrow_mut().commands.push(command);
    }

    fn with_program<T>(&self, program: &ProgramHandle, f: impl FnOnce(&ProgramDesc) -> T) -> Option<T> {
        self.state.borrow().programs.get(&program.0).map(f)
    }
}

impl GpuBackend for RecordingBackend {
    type Program = ProgramHandle;
    type Texture = TextureHandle;
    type Buffer = BufferHandle;

    fn link_status(&self, program: &ProgramHandle) -> Result<(), String> {
        match self.with_program(program, |desc| desc.link_log.clone()) {
            Some(None) => Ok(()),
            Some(Some(log)) => Err(log),
            None => Err(format!("program {} does not exist", program.0)),
        }
    }

    fn uniform_location(&self, program: &ProgramHandle, name: &str) -> Option<Location> {
        self.with_program(program, |desc| desc.uniforms.get(name).copied())
            .flatten()
    }

    fn attribute_location(&self, program: &ProgramHandle, name: &str) -> Option<Location> {
        self.with_program(program, |desc| desc.attributes.get(name).copied())
            .flatten()
    }

    fn prepare_program(
        &mut self,
        program: &ProgramHandle,
        _locations: &ShaderLocations,
    ) -> Result<(), String> {
        if let Some(Some(error)) = self.with_program(program, |desc| desc.prepare_error.clone()) {
            return Err(error);
        }
        self.record(GpuCommand::PrepareProgram { program: program.0 });
        Ok(())
    }

    fn release_program(&mut self, program: ProgramHandle) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program.0);
        state.released_programs.push(program.0);
        state.commands.push(GpuCommand::ReleaseProgram(program.0));
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        let mut state = self.state.borrow_mut();
        state.textures.remove(&texture.0);
        state.released_textures.push(texture.0);
        state.commands.push(GpuCommand::ReleaseTexture(texture.0));
    }

    fn create_instance_buffer(&mut self, size: u64) -> Result<BufferHandle, String> {
        let mut state = self.state.borrow_mut();
        if let Some(max) = state.max_buffer_size {
            if size > max {
                return Err(format!("buffer of {size} bytes exceeds limit of {max} bytes"));
            }
        }
        let id = state.next_id();
        state.buffers.insert(id);
        state.commands.push(GpuCommand::CreateBuffer { buffer: id, size });
        Ok(BufferHandle { id, size })
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer.id);
        state.released_buffers.push(buffer.id);
        state.commands.push(GpuCommand::ReleaseBuffer(buffer.id));
    }

    fn bind_program(&mut self, program: &ProgramHandle) {
        self.record(GpuCommand::BindProgram(program.0));
    }

    fn bind_texture(&mut self, unit: u32, texture: &TextureHandle) {
        self.record(GpuCommand::BindTexture {
            unit,
            texture: texture.0,
        });
    }

    fn set_uniform_matrix(&mut self, location: Location, matrix: &Mat4) {
        self.record(GpuCommand::SetUniformMatrix {
            location,
            matrix: *matrix,
        });
    }

    fn upload_instances(&mut self, buffer: &BufferHandle, bytes: &[u8]) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        if let Some(error) = &state.upload_error {
            return Err(error.clone());
        }
        if bytes.len() as u64 > buffer.size {
            return Err(format!(
                "upload of {} bytes overflows buffer {} ({} bytes)",
                bytes.len(),
                buffer.id,
                buffer.size
            ));
        }
        state.commands.push(GpuCommand::UploadInstances {
            buffer: buffer.id,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn draw_quad_instanced(
        &mut self,
        buffer: &BufferHandle,
        instance_count: u32,
    ) -> Result<(), String> {
        self.record(GpuCommand::DrawQuadInstanced {
            buffer: buffer.id,
            instance_count,
        });
        Ok(())
    }
}
