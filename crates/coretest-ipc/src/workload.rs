// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Reference CPU benchmark run by either core
//!
//! Each iteration mixes a small integer matrix multiply, a linked walk over a fixed list and a
//! CRC-16 fold of the intermediate results. The checksum depends only on the iteration count,
//! so both cores must agree on it for the same input.

use std::time::Instant;

use crate::message::BenchmarkReport;

const MATRIX_DIM: usize = 6;
const LIST_LEN: usize = 32;

fn crc16(mut crc: u16, data: u16) -> u16 {
    for byte in data.to_le_bytes() {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xA001 } else { crc >> 1 };
        }
    }
    crc
}

fn matrix_pass(seed: u16) -> u16 {
    let mut a = [[0i32; MATRIX_DIM]; MATRIX_DIM];
    let mut b = [[0i32; MATRIX_DIM]; MATRIX_DIM];
    for i in 0..MATRIX_DIM {
        for j in 0..MATRIX_DIM {
            a[i][j] = (i32::from(seed) + (i * MATRIX_DIM + j) as i32) & 0xff;
            b[i][j] = (i32::from(seed) ^ (j * MATRIX_DIM + i) as i32) & 0xff;
        }
    }
    let mut acc = 0i32;
    for i in 0..MATRIX_DIM {
        for j in 0..MATRIX_DIM {
            let mut cell = 0i32;
            for k in 0..MATRIX_DIM {
                cell = cell.wrapping_add(a[i][k].wrapping_mul(b[k][j]));
            }
            acc = acc.wrapping_add(cell);
        }
    }
    acc as u16
}

fn list_pass(seed: u16) -> u16 {
    let mut next = [0usize; LIST_LEN];
    for (i, slot) in next.iter_mut().enumerate() {
        *slot = (i * 7 + usize::from(seed)) % LIST_LEN;
    }
    let mut at = usize::from(seed) % LIST_LEN;
    let mut sum = 0u16;
    for _ in 0..LIST_LEN {
        sum = sum.wrapping_add(at as u16);
        at = next[at];
    }
    sum
}

/// Checksum produced by `iterations` rounds of the workload
pub fn workload_checksum(iterations: u32) -> u32 {
    let mut crc = 0u16;
    for i in 0..iterations {
        let seed = (i as u16) ^ crc;
        crc = crc16(crc, matrix_pass(seed));
        crc = crc16(crc, list_pass(seed));
    }
    u32::from(crc)
}

/// Time `iterations` rounds of the workload on the calling thread
pub fn run_reference_workload(iterations: u32) -> BenchmarkReport {
    let started = Instant::now();
    let checksum = workload_checksum(iterations);
    let elapsed_us = (started.elapsed().as_micros() as u64).max(1);

    BenchmarkReport {
        iterations,
        elapsed_us,
        checksum,
        iterations_per_sec: (f64::from(iterations) * 1_000_000.0 / elapsed_us as f64) as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_deterministic() {
        assert_eq!(workload_checksum(50), workload_checksum(50));
        assert!(workload_checksum(50) <= u32::from(u16::MAX));
    }

    #[test]
    fn test_zero_iterations() {
        let report = run_reference_workload(0);
        assert_eq!(report.checksum, 0);
        assert_eq!(report.iterations_per_sec, 0.0);
    }

    #[test]
    fn test_report_fields() {
        let report = run_reference_workload(100);
        assert_eq!(report.iterations, 100);
        assert_eq!(report.checksum, workload_checksum(100));
        assert!(report.elapsed_us >= 1);
        assert!(report.iterations_per_sec > 0.0);
    }
}
