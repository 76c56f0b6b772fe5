// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! State shared by every command

use std::sync::Arc;
use std::time::Duration;

use coretest_config::{CoretestConfig, PerformanceTierSetting};
use coretest_hal::sim::{
    ScriptedRuntime, SimAccelerator, SimAudio, SimBoard, SimCamera, SimGpio, SimTemperature,
};
use coretest_hal::{
    Accelerator, AudioInput, BoardInfo, Camera, Gpio, InferenceRuntime, PerformanceTier,
    TemperatureSensors,
};
use coretest_ipc::loopback::{LoopbackLink, LoopbackOptions};
use coretest_ipc::{CommandBridge, MessageChannel, Satellite};
use coretest_resources::ResourceStore;

/// Everything a handler may touch
///
/// The dispatch task owns exactly one context and lends it to one handler at a time.
pub struct CommandContext {
    pub resources: ResourceStore,
    pub bridge: CommandBridge,
    pub satellite: Arc<dyn Satellite>,
    pub camera: Box<dyn Camera>,
    pub accelerator: Box<dyn Accelerator>,
    pub audio: Box<dyn AudioInput>,
    pub temperature: Box<dyn TemperatureSensors>,
    pub gpio: Box<dyn Gpio>,
    pub board: Box<dyn BoardInfo>,
    pub runtime: Box<dyn InferenceRuntime>,
    pub config: CoretestConfig,
}

impl CommandContext {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.config.bridge.liveness_probe_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.config.bridge.call_timeout_ms)
    }

    pub fn benchmark_timeout(&self) -> Duration {
        Duration::from_millis(self.config.bridge.benchmark_timeout_ms)
    }

    /// Tier for classification and the self-test
    pub fn default_tier(&self) -> PerformanceTier {
        match self.config.inference.performance_tier {
            PerformanceTierSetting::Low => PerformanceTier::Low,
            PerformanceTierSetting::Medium => PerformanceTier::Medium,
            PerformanceTierSetting::High => PerformanceTier::High,
            PerformanceTierSetting::Max => PerformanceTier::Max,
        }
    }
}

/// Handles on every simulated device
///
/// Fields may be swapped before [`SimulatedBoard::context`] builds the command context; the
/// board keeps its own clones so callers can inspect device state afterwards.
#[derive(Clone)]
pub struct SimulatedBoard {
    pub link: Arc<LoopbackLink>,
    pub camera: SimCamera,
    pub accelerator: SimAccelerator,
    pub audio: SimAudio,
    pub temperature: SimTemperature,
    pub gpio: SimGpio,
    pub board: SimBoard,
    pub runtime: ScriptedRuntime,
}

impl SimulatedBoard {
    /// Board with a loopback satellite that has not been started
    pub fn new(options: LoopbackOptions) -> coretest_ipc::Result<Self> {
        Ok(Self {
            link: Arc::new(LoopbackLink::new(options)?),
            camera: SimCamera::default(),
            accelerator: SimAccelerator::new(),
            audio: SimAudio::new(),
            temperature: SimTemperature::default(),
            gpio: SimGpio::new(),
            board: SimBoard::default(),
            runtime: ScriptedRuntime::default(),
        })
    }

    pub fn context(&self, config: CoretestConfig) -> CommandContext {
        let channel: Arc<dyn MessageChannel> = self.link.clone();
        let satellite: Arc<dyn Satellite> = self.link.clone();
        let budget = usize::try_from(config.resources.max_total_bytes).unwrap_or(usize::MAX);

        CommandContext {
            resources: ResourceStore::with_budget(budget),
            bridge: CommandBridge::new(
                channel,
                Duration::from_millis(config.bridge.liveness_probe_ms),
            ),
            satellite,
            camera: Box::new(self.camera.clone()),
            accelerator: Box::new(self.accelerator.clone()),
            audio: Box::new(self.audio.clone()),
            temperature: Box::new(self.temperature.clone()),
            gpio: Box::new(self.gpio.clone()),
            board: Box::new(self.board.clone()),
            runtime: Box::new(self.runtime.clone()),
            config,
        }
    }
}
