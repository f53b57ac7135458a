#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // Header bytes: width, height, format index, extra stride.

    // ARGB8888 2x2, packed
    let mut argb = vec![2u8, 2, 1, 0];
    argb.extend_from_slice(&[0xff, 0xff, 0, 0, 0xff, 0, 0xff, 0, 0xff, 0, 0, 0xff, 0x80, 0x80, 0x80, 0x80]);
    fs::write(format!("{dir}/argb_2x2.bin"), argb).unwrap();

    // RGB565 3x2, 2 bytes row padding
    let mut rgb565 = vec![3u8, 2, 0, 2];
    rgb565.extend_from_slice(&[0xf8, 0x00, 0x07, 0xe0, 0x00, 0x1f, 0, 0]);
    rgb565.extend_from_slice(&[0xff, 0xff, 0x84, 0x10, 0x00, 0x00, 0, 0]);
    fs::write(format!("{dir}/rgb565_3x2_padded.bin"), rgb565).unwrap();

    // BGRA8888 1x1, truncated
    fs::write(format!("{dir}/bgra_truncated.bin"), [1u8, 1, 3, 0, 0x10, 0x20]).unwrap();

    let dir = "fuzz/corpus/fuzz_roundtrip";
    fs::create_dir_all(dir).unwrap();

    // Width, format index, extra stride, then RGBA pixels
    let mut rgba = vec![2u8, 0, 6];
    rgba.extend_from_slice(&[255, 0, 0, 255, 0, 255, 0, 128, 0, 0, 255, 0, 7, 7, 7, 7]);
    fs::write(format!("{dir}/rgba_2x2.bin"), rgba).unwrap();

    println!("Seeds written to fuzz/corpus/");
}
