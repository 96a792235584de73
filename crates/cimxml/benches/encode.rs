// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//!
//! Benchmark: CIM-XML encode and parse of instances and instance names
//!
//! Measures the serializer and the validating reader on an instance with a
//! configurable number of properties.

#![allow(clippy::uninlined_format_args)]

use cimxml::{
    encode_to_string, parse_instance, CimObject, CodecConfig, Instance, InstanceName, Scalar,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn build_instance(props: u32) -> Instance {
    let mut inst = Instance::new("CIM_BenchDevice");
    for i in 0..props {
        let result = match i % 3 {
            0 => inst.set(format!("Count{}", i), Scalar::Uint32(i)),
            1 => inst.set(format!("Label{}", i), format!("device <{}> & co", i)),
            _ => inst.set(format!("Enabled{}", i), Scalar::Boolean(i % 2 == 0)),
        };
        result.expect("bench property");
    }
    inst
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_instance");
    for props in [4u32, 32, 256] {
        let obj = CimObject::Instance(build_instance(props));
        group.bench_with_input(BenchmarkId::from_parameter(props), &obj, |b, obj| {
            b.iter(|| encode_to_string(black_box(obj)).expect("encode"));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let config = CodecConfig::default();
    let mut group = c.benchmark_group("parse_instance");
    for props in [4u32, 32, 256] {
        let xml = encode_to_string(&CimObject::Instance(build_instance(props))).expect("encode");
        group.bench_with_input(BenchmarkId::from_parameter(props), &xml, |b, xml| {
            b.iter(|| parse_instance(black_box(xml), &config).expect("parse"));
        });
    }
    group.finish();
}

fn bench_instance_name(c: &mut Criterion) {
    let name = InstanceName::with_keybindings(
        "CIM_BenchDevice",
        [("SystemName", "host01"), ("DeviceID", "disk0"), ("Tag", "a\"b")],
    );
    c.bench_function("instance_name_canonical", |b| {
        b.iter(|| black_box(&name).to_string());
    });
    c.bench_function("instance_name_from_str", |b| {
        let text = name.to_string();
        b.iter(|| black_box(text.as_str()).parse::<InstanceName>().expect("parse"));
    });
}

criterion_group!(benches, bench_encode, bench_parse, bench_instance_name);
criterion_main!(benches);
