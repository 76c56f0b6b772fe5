// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Chunked resource upload

use coretest_rpc::Params;
use serde_json::{json, Value};
use tracing::debug;

use crate::context::CommandContext;
use crate::error::CommandResult;

pub fn begin_upload_resource(ctx: &mut CommandContext, params: &Params<'_>) -> CommandResult<Value> {
    let name = params.string("name")?;
    let size = params.integer_as::<usize>("size")?;
    ctx.resources.begin(&name, size)?;
    Ok(json!({}))
}

pub fn upload_resource_chunk(ctx: &mut CommandContext, params: &Params<'_>) -> CommandResult<Value> {
    let name = params.string("name")?;
    let offset = params.integer_as::<usize>("offset")?;
    let data = params.text("data")?;
    let written = ctx.resources.chunk(&name, offset, data)?;
    debug!(target: "coretest-commands", "{} bytes into '{}' at {}", written, name, offset);
    Ok(json!({}))
}

pub fn delete_resource(ctx: &mut CommandContext, params: &Params<'_>) -> CommandResult<Value> {
    let name = params.string("name")?;
    ctx.resources.delete(&name)?;
    Ok(json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, params};
    use coretest_rpc::{codes, RpcError};

    fn code(result: CommandResult<Value>) -> i64 {
        RpcError::from(result.unwrap_err()).code()
    }

    #[test]
    fn test_upload_flow() {
        let (_board, mut ctx) = context();
        begin_upload_resource(&mut ctx, &params(&json!({"name": "img", "size": 6}))).unwrap();
        upload_resource_chunk(
            &mut ctx,
            &params(&json!({"name": "img", "offset": 2, "data": "AQID"})),
        )
        .unwrap();
        assert_eq!(ctx.resources.get("img").unwrap(), &[0, 0, 1, 2, 3, 0]);

        delete_resource(&mut ctx, &params(&json!({"name": "img"}))).unwrap();
        assert!(!ctx.resources.contains("img"));
    }

    #[test]
    fn test_upload_errors() {
        let (_board, mut ctx) = context();
        let chunk = json!({"name": "img", "offset": 0, "data": "AQID"});
        assert_eq!(
            code(upload_resource_chunk(&mut ctx, &params(&chunk))),
            codes::RESOURCE_NOT_FOUND
        );

        begin_upload_resource(&mut ctx, &params(&json!({"name": "img", "size": 2}))).unwrap();
        assert_eq!(
            code(upload_resource_chunk(&mut ctx, &params(&chunk))),
            codes::RESOURCE_OVERFLOW
        );

        let garbage = json!({"name": "img", "offset": 0, "data": "@@@"});
        assert_eq!(
            code(upload_resource_chunk(&mut ctx, &params(&garbage))),
            codes::BAD_PARAMS
        );

        assert_eq!(
            code(begin_upload_resource(&mut ctx, &params(&json!({"name": "x", "size": -1})))),
            codes::BAD_PARAMS
        );
        assert_eq!(
            code(delete_resource(&mut ctx, &params(&json!({"name": "never"})))),
            codes::RESOURCE_NOT_FOUND
        );
    }
}
