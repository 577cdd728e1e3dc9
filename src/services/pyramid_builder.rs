//! Multi-resolution image pyramid by iterative 2x2 box filtering.

use crate::domain::models::{Frame, Pyramid, PyramidLevel, CHANNELS};

/// Build a pyramid of `levels` levels (at least 1) from `frame`.
///
/// Level 0 copies the frame bytes. Each following level halves width and
/// height (floor, minimum 1); every destination pixel is the rounded mean of
/// the in-bounds source pixels of its 2x2 block, channel by channel. Source
/// pixels outside the declared dimensions or past the end of the buffer are
/// left out of the mean instead of counted as zero.
pub fn build_pyramid(frame: &Frame, levels: usize) -> Pyramid {
    let levels = levels.max(1);
    let mut out = Vec::with_capacity(levels);

    out.push(PyramidLevel {
        scale: 1.0,
        width: frame.width.max(1),
        height: frame.height.max(1),
        data: frame.pixels.clone(),
    });

    for i in 1..levels {
        let Some(prev) = out.last() else { break };
        let next = downscale(prev, 0.5_f64.powi(i as i32));
        out.push(next);
    }

    Pyramid {
        t: frame.t,
        levels: out,
    }
}

fn downscale(src: &PyramidLevel, scale: f64) -> PyramidLevel {
    let w2 = (src.width / 2).max(1);
    let h2 = (src.height / 2).max(1);
    let mut data = vec![0u8; w2 * h2 * CHANNELS];

    for y in 0..h2 {
        for x in 0..w2 {
            let mut acc = [0u32; CHANNELS];
            let mut count = 0u32;

            for dy in 0..2 {
                for dx in 0..2 {
                    if let Some(px) = src.rgba_at(x * 2 + dx, y * 2 + dy) {
                        for (sum, &channel) in acc.iter_mut().zip(px) {
                            *sum += u32::from(channel);
                        }
                        count += 1;
                    }
                }
            }

            if count == 0 {
                continue;
            }

            let dst = (y * w2 + x) * CHANNELS;
            for (c, sum) in acc.iter().enumerate() {
                // round half up
                data[dst + c] = ((sum * 2 + count) / (count * 2)) as u8;
            }
        }
    }

    PyramidLevel {
        scale,
        width: w2,
        height: h2,
        data,
    }
}
