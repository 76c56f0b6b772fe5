// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::accelerator::PerformanceTier;
use crate::error::{HalError, HalResult};
use crate::inference::{
    BuiltinModel, Classification, Detection, InferenceRuntime, Interpreter, TensorShape,
};

/// Schema version accepted by the scripted runtime
pub const TFLITE_SCHEMA_VERSION: u32 = 3;

/// Canned behaviour for [`ScriptedRuntime`]
#[derive(Debug, Clone)]
pub struct RuntimeScript {
    pub schema_version: u32,
    pub input_shape: TensorShape,
    pub detections: Vec<Detection>,
    pub classifications: Vec<Classification>,
    pub needs_preprocessing: bool,
    pub min_arena_bytes: usize,
    pub fail_load: bool,
    pub fail_invoke: bool,
    /// Invocations beyond this many fail
    pub fail_invoke_after: Option<usize>,
    pub fail_self_test: bool,
}

impl Default for RuntimeScript {
    fn default() -> Self {
        Self {
            schema_version: TFLITE_SCHEMA_VERSION,
            input_shape: TensorShape {
                height: 16,
                width: 16,
                depth: 3,
            },
            detections: Vec::new(),
            classifications: Vec::new(),
            needs_preprocessing: false,
            min_arena_bytes: 0,
            fail_load: false,
            fail_invoke: false,
            fail_invoke_after: None,
            fail_self_test: false,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RuntimeStats {
    pub loads: usize,
    pub builtin_loads: usize,
    pub invocations: usize,
    pub preprocess_runs: usize,
    pub self_tests: usize,
    pub last_model_len: usize,
    pub last_input: Vec<u8>,
}

struct Shared {
    script: RuntimeScript,
    stats: RuntimeStats,
}

/// Inference runtime that replays a [`RuntimeScript`] and records what it was asked to do
#[derive(Clone)]
pub struct ScriptedRuntime {
    shared: Arc<Mutex<Shared>>,
}

impl Default for ScriptedRuntime {
    fn default() -> Self {
        Self::new(RuntimeScript::default())
    }
}

impl ScriptedRuntime {
    pub fn new(script: RuntimeScript) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                script,
                stats: RuntimeStats::default(),
            })),
        }
    }

    pub fn stats(&self) -> RuntimeStats {
        self.shared.lock().stats.clone()
    }

    /// Replace the script for subsequent loads
    pub fn set_script(&self, script: RuntimeScript) {
        self.shared.lock().script = script;
    }

    fn interpreter(&self, arena: &[u8]) -> HalResult<ScriptedInterpreter> {
        let shared = self.shared.lock();
        if shared.script.fail_load {
            return Err(HalError::Device("model rejected by runtime".to_string()));
        }
        if arena.len() < shared.script.min_arena_bytes {
            return Err(HalError::Device(format!(
                "arena of {} bytes is smaller than the required {}",
                arena.len(),
                shared.script.min_arena_bytes
            )));
        }
        let input_len = shared
            .script
            .input_shape
            .len()
            .ok_or_else(|| HalError::Device("input tensor is too large".to_string()))?;

        Ok(ScriptedInterpreter {
            shared: Arc::clone(&self.shared),
            input: vec![0u8; input_len],
        })
    }
}

impl InferenceRuntime for ScriptedRuntime {
    fn supported_schema_version(&self) -> u32 {
        self.shared.lock().script.schema_version
    }

    fn load<'a>(
        &'a mut self,
        model: &'a [u8],
        arena: &'a mut [u8],
    ) -> HalResult<Box<dyn Interpreter + 'a>> {
        let interpreter = self.interpreter(arena)?;
        let mut shared = self.shared.lock();
        shared.stats.loads += 1;
        shared.stats.last_model_len = model.len();
        Ok(Box::new(interpreter))
    }

    fn load_builtin<'a>(
        &'a mut self,
        model: BuiltinModel,
        arena: &'a mut [u8],
    ) -> HalResult<Box<dyn Interpreter + 'a>> {
        let interpreter = self.interpreter(arena)?;
        self.shared.lock().stats.builtin_loads += 1;
        debug!(target: "coretest-hal", "Loaded built-in {:?}", model);
        Ok(Box::new(interpreter))
    }

    fn self_test(&mut self, _tier: PerformanceTier) -> HalResult<()> {
        let mut shared = self.shared.lock();
        shared.stats.self_tests += 1;
        if shared.script.fail_self_test {
            return Err(HalError::Device("convolution output mismatch".to_string()));
        }
        Ok(())
    }
}

struct ScriptedInterpreter {
    shared: Arc<Mutex<Shared>>,
    input: Vec<u8>,
}

impl Interpreter for ScriptedInterpreter {
    fn input_shape(&self) -> TensorShape {
        self.shared.lock().script.input_shape
    }

    fn input_mut(&mut self) -> &mut [u8] {
        &mut self.input
    }

    fn needs_preprocessing(&self) -> bool {
        self.shared.lock().script.needs_preprocessing
    }

    fn preprocess(&mut self) -> HalResult<()> {
        self.shared.lock().stats.preprocess_runs += 1;
        Ok(())
    }

    fn invoke(&mut self) -> HalResult<()> {
        let mut shared = self.shared.lock();
        let exhausted = shared
            .script
            .fail_invoke_after
            .is_some_and(|limit| shared.stats.invocations >= limit);
        if shared.script.fail_invoke || exhausted {
            return Err(HalError::Device("invoke failed".to_string()));
        }
        shared.stats.invocations += 1;
        shared.stats.last_input.clone_from(&self.input);
        Ok(())
    }

    fn detections(&self) -> Vec<Detection> {
        self.shared.lock().script.detections.clone()
    }

    fn classifications(&self) -> Vec<Classification> {
        self.shared.lock().script.classifications.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_invoke_are_recorded() {
        let mut runtime = ScriptedRuntime::default();
        let probe = runtime.clone();
        let model = [1u8; 32];
        let mut arena = vec![0u8; 64];
        {
            let mut interpreter = runtime.load(&model, &mut arena).unwrap();
            assert_eq!(interpreter.input_mut().len(), 16 * 16 * 3);
            interpreter.input_mut()[0] = 9;
            interpreter.invoke().unwrap();
        }
        let stats = probe.stats();
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.invocations, 1);
        assert_eq!(stats.last_model_len, 32);
        assert_eq!(stats.last_input[0], 9);
    }

    #[test]
    fn test_builtin_load_and_invoke_limit() {
        let mut runtime = ScriptedRuntime::new(RuntimeScript {
            fail_invoke_after: Some(1),
            ..RuntimeScript::default()
        });
        let probe = runtime.clone();
        let mut arena = vec![0u8; 64];
        {
            let mut interpreter = runtime.load_builtin(BuiltinModel::Posenet, &mut arena).unwrap();
            assert!(interpreter.invoke().is_ok());
            assert!(interpreter.invoke().is_err());
        }
        let stats = probe.stats();
        assert_eq!(stats.builtin_loads, 1);
        assert_eq!(stats.loads, 0);
        assert_eq!(stats.invocations, 1);
    }

    #[test]
    fn test_small_arena_rejected() {
        let mut runtime = ScriptedRuntime::new(RuntimeScript {
            min_arena_bytes: 1024,
            ..RuntimeScript::default()
        });
        let mut arena = vec![0u8; 16];
        assert!(runtime.load(&[0u8; 4], &mut arena).is_err());
        assert_eq!(runtime.stats().loads, 0);
    }
}
