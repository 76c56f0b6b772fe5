// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Classification and detection on uploaded models
//!
//! Both commands share one pipeline: resolve the model and image resources, check the model's
//! schema version, open the accelerator, load the model into a scratch arena, fit the image to
//! the input tensor, run a warm-up and a timed invocation, then rank the outputs.

pub mod model;
pub mod resize;
pub mod results;

use std::time::Instant;

use coretest_hal::{AcceleratorSettings, DeviceSession, PerformanceTier};
use coretest_rpc::{Params, RpcError};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::context::CommandContext;
use crate::error::CommandResult;

pub use model::{schema_version, ModelFormatError};
pub use resize::{resize_into, ImageDims};
pub use results::{select_top, ClassificationRecord, DetectionRecord, InferenceReport};

/// Parameters common to both inference commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub model_resource_name: String,
    pub image_resource_name: String,
    pub image: ImageDims,
}

impl InferenceRequest {
    pub fn from_params(params: &Params<'_>) -> CommandResult<Self> {
        let request = Self {
            model_resource_name: params.string("model_resource_name")?,
            image_resource_name: params.string("image_resource_name")?,
            image: ImageDims {
                width: params.integer_as("image_width")?,
                height: params.integer_as("image_height")?,
                depth: params.integer_as("image_depth")?,
            },
        };
        if request.image.len().is_none() {
            return Err(
                RpcError::bad_param("image_width", "image dimensions are too large").into(),
            );
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelKind {
    Classification,
    Detection,
}

struct Pipeline {
    kind: ModelKind,
    tier: PerformanceTier,
    arena_bytes: usize,
}

/// Raw outputs of one timed invocation
struct Outcome<T> {
    candidates: Vec<T>,
    latency_us: u64,
}

fn micros(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX)
}

fn run<T>(
    ctx: &mut CommandContext,
    request: &InferenceRequest,
    pipeline: Pipeline,
    collect: impl FnOnce(&dyn coretest_hal::Interpreter) -> Vec<T>,
) -> CommandResult<Outcome<T>> {
    let model = ctx.resources.get(&request.model_resource_name)?;
    if model.is_empty() {
        return Err(RpcError::resource_not_found(&request.model_resource_name).into());
    }
    let image = ctx.resources.get(&request.image_resource_name)?;

    let version = schema_version(model).map_err(|e| RpcError::failed(e.to_string()))?;
    let supported = ctx.runtime.supported_schema_version();
    if version != supported {
        return Err(RpcError::UnsupportedModel(version).into());
    }

    let _accelerator = DeviceSession::acquire(
        ctx.accelerator.as_mut(),
        AcceleratorSettings {
            tier: pipeline.tier,
        },
    )
    .map_err(|e| RpcError::DeviceUnavailable(format!("failed to open TPU: {}", e)))?;

    let mut arena = Vec::new();
    arena.try_reserve_exact(pipeline.arena_bytes).map_err(|_| {
        RpcError::failed(format!(
            "out of memory allocating {} byte tensor arena",
            pipeline.arena_bytes
        ))
    })?;
    arena.resize(pipeline.arena_bytes, 0u8);

    let mut interpreter = ctx
        .runtime
        .load(model, &mut arena)
        .map_err(|_| RpcError::failed("failed to make interpreter"))?;

    let preprocess_started = Instant::now();
    let shape = interpreter.input_shape();
    resize_into(image, request.image, interpreter.input_mut(), shape)
        .map_err(|e| RpcError::failed(format!("failed to resize input image: {}", e)))?;
    if pipeline.kind == ModelKind::Classification && interpreter.needs_preprocessing() {
        interpreter
            .preprocess()
            .map_err(|e| RpcError::failed(format!("failed to preprocess input: {}", e)))?;
    }
    let preprocess_us = micros(preprocess_started);

    // First invoke carries the model transfer to the accelerator
    interpreter
        .invoke()
        .map_err(|_| RpcError::failed("failed to invoke interpreter"))?;

    let invoke_started = Instant::now();
    interpreter
        .invoke()
        .map_err(|_| RpcError::failed("failed to invoke interpreter"))?;
    let invoke_us = micros(invoke_started);

    debug!(
        target: "coretest-commands",
        "{:?}: preprocess {} us, invoke {} us",
        pipeline.kind,
        preprocess_us,
        invoke_us
    );

    Ok(Outcome {
        candidates: collect(interpreter.as_ref()),
        latency_us: preprocess_us.saturating_add(invoke_us),
    })
}

fn report<T: Serialize>(results: Vec<T>, latency: u64) -> CommandResult<Value> {
    if results.is_empty() {
        return Err(RpcError::failed("no results above threshold").into());
    }
    serde_json::to_value(InferenceReport { results, latency })
        .map_err(|e| RpcError::failed(e.to_string()).into())
}

/// Object detection at the maximum accelerator tier
pub fn run_detection_model(ctx: &mut CommandContext, params: &Params<'_>) -> CommandResult<Value> {
    let request = InferenceRequest::from_params(params)?;
    let (threshold, top_k) = (
        ctx.config.inference.detection_threshold,
        ctx.config.inference.detection_top_k,
    );
    let pipeline = Pipeline {
        kind: ModelKind::Detection,
        tier: PerformanceTier::Max,
        arena_bytes: ctx.config.inference.detection_arena_bytes,
    };

    let outcome = run(ctx, &request, pipeline, |interpreter| interpreter.detections())?;
    let results: Vec<DetectionRecord> =
        select_top(outcome.candidates, |d| d.score, threshold, top_k)
            .into_iter()
            .map(DetectionRecord::from)
            .collect();
    info!(
        target: "coretest-commands",
        "Detection on '{}': {} results in {} us",
        request.image_resource_name,
        results.len(),
        outcome.latency_us
    );
    report(results, outcome.latency_us)
}

/// Image classification at the configured accelerator tier
pub fn run_classification_model(
    ctx: &mut CommandContext,
    params: &Params<'_>,
) -> CommandResult<Value> {
    let request = InferenceRequest::from_params(params)?;
    let (threshold, top_k) = (
        ctx.config.inference.classification_threshold,
        ctx.config.inference.classification_top_k,
    );
    let pipeline = Pipeline {
        kind: ModelKind::Classification,
        tier: ctx.default_tier(),
        arena_bytes: ctx.config.inference.classification_arena_bytes,
    };

    let outcome = run(ctx, &request, pipeline, |interpreter| interpreter.classifications())?;
    let results: Vec<ClassificationRecord> =
        select_top(outcome.candidates, |c| c.score, threshold, top_k)
            .into_iter()
            .map(ClassificationRecord::from)
            .collect();
    info!(
        target: "coretest-commands",
        "Classification on '{}': {} results in {} us",
        request.image_resource_name,
        results.len(),
        outcome.latency_us
    );
    report(results, outcome.latency_us)
}
