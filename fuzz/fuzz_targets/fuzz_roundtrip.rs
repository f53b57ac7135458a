#![no_main]
use libfuzzer_sys::fuzz_target;
use zenfb::*;

fuzz_target!(|data: &[u8]| {
    let [w, f, pad, rest @ ..] = data else {
        return;
    };
    let format = ColorFormat::ALL[*f as usize % ColorFormat::ALL.len()];
    let w = u32::from(*w).max(1);
    let h = (rest.len() / 4) as u32 / w;
    let Ok(grid) = PixelGrid::from_rgba_bytes(rest, w, h) else {
        return;
    };
    let Ok(stride) = stride_for(w, format) else { return };
    let layout = Layout::new(w, h, stride + u32::from(*pad) % 32, format).unwrap();

    let fb = encode(&grid, &layout, false, &enough::Unstoppable).unwrap();
    assert_eq!(fb.as_bytes().len(), layout.buffer_len().unwrap());
    for y in 0..h {
        assert!(fb.row_padding(y).unwrap().iter().all(|&b| b == 0), "padding not zeroed");
    }

    // A decoded frame is always representable, so a second pass is exact.
    let once = fb.decode(enough::Unstoppable).unwrap();
    let again = encode(&once, &layout, false, &enough::Unstoppable).unwrap();
    assert_eq!(fb, again, "re-encode mismatch");
    assert_eq!(again.decode(enough::Unstoppable).unwrap(), once);
});
