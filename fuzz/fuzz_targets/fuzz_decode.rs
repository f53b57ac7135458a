#![no_main]
use libfuzzer_sys::fuzz_target;
use zenfb::*;

// Header: width, height, format index, extra stride; the rest is the dump.
fuzz_target!(|data: &[u8]| {
    let [w, h, f, pad, rest @ ..] = data else {
        return;
    };
    let format = ColorFormat::ALL[*f as usize % ColorFormat::ALL.len()];
    let (w, h) = (u32::from(*w), u32::from(*h));

    // Must never panic, whatever the stride or buffer length
    let stride = stride_for(w, format).unwrap_or(0) + u32::from(*pad) % 64;
    if let Ok(layout) = Layout::new(w, h, stride, format) {
        let _ = decode(rest, &layout, &enough::Unstoppable);
    }
    let _ = DecodeRequest::new(rest, w, h, format).decode(enough::Unstoppable);
    let _ = DecodeRequest::new(rest, w, h, format)
        .with_stride(u32::from(*pad))
        .decode(enough::Unstoppable);
});
