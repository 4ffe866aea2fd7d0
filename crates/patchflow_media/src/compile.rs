// SPDX-License-Identifier: MIT OR Apache-2.0
//! Content-addressed shader compile cache.
//!
//! Compiled programs are keyed by the full fragment source text, so two
//! distinct shaders can never be conflated by a key collision. A program
//! is compiled once per unique source and reused thereafter; failures
//! cache nothing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque handle to a compiled GPU program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramHandle(pub u64);

/// Shader compilation failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("shader compilation failed: {0}")]
pub struct CompileError(pub String);

/// Compiles vertex + fragment source into a program.
///
/// Implemented by the render backend; invoked at most once per unique
/// fragment source.
pub trait ShaderCompiler {
    /// Compile the given sources.
    fn compile(&mut self, vertex: &str, fragment: &str) -> Result<ProgramHandle, CompileError>;
}

/// Memoizes compiled programs by fragment source text.
#[derive(Debug, Default)]
pub struct ShaderCompileCache {
    programs: HashMap<String, ProgramHandle>,
}

impl ShaderCompileCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached program for `fragment`, compiling it on first
    /// use. A failed compile stores nothing, so a later call will retry.
    pub fn get_or_compile(
        &mut self,
        compiler: &mut dyn ShaderCompiler,
        vertex: &str,
        fragment: &str,
    ) -> Result<ProgramHandle, CompileError> {
        if let Some(&program) = self.programs.get(fragment) {
            return Ok(program);
        }
        let program = compiler.compile(vertex, fragment)?;
        self.programs.insert(fragment.to_string(), program);
        Ok(program)
    }

    /// Number of cached programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Whether nothing has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
