//! Connected-component region extraction.

use std::collections::VecDeque;

use hotspot_core::params::Sensitivity;
use hotspot_core::types::BoundingBox;

use crate::mask::WarmMask;

const NEIGHBORS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Extract candidate regions from the warm mask.
///
/// 4-connected flood fill in row-major scan order; each component yields its
/// axis-aligned bounding box. Components smaller than
/// `Sensitivity::min_region_area` are discarded. Boxes are returned in the
/// order their first pixel is reached by the scan, which downstream
/// consumers rely on for determinism.
pub fn extract_regions(mask: &WarmMask, sensitivity: &Sensitivity) -> Vec<BoundingBox> {
    let width = mask.width();
    let height = mask.height();
    let min_area = sensitivity.min_region_area(width, height);

    let mut visited = vec![false; (width as usize) * (height as usize)];
    let mut boxes = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            if !mask.get(x, y) || visited[idx] {
                continue;
            }

            visited[idx] = true;
            queue.push_back((x, y));
            let (mut min_x, mut max_x) = (x, x);
            let (mut min_y, mut max_y) = (y, y);
            let mut area: u64 = 0;

            while let Some((px, py)) = queue.pop_front() {
                area += 1;
                min_x = min_x.min(px);
                max_x = max_x.max(px);
                min_y = min_y.min(py);
                max_y = max_y.max(py);

                for (dx, dy) in NEIGHBORS {
                    let nx = px as i64 + dx;
                    let ny = py as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let (nx, ny) = (nx as u32, ny as u32);
                    let nidx = (ny * width + nx) as usize;
                    if mask.get(nx, ny) && !visited[nidx] {
                        visited[nidx] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }

            if area >= min_area {
                boxes.push(BoundingBox::new(
                    min_x,
                    min_y,
                    max_x - min_x + 1,
                    max_y - min_y + 1,
                ));
            }
        }
    }

    boxes
}
