// ============================================
// Ambient Occlusion + Vertex Light
// ============================================

/// Яркость угла по числу твёрдых соседей (0..3)
pub const AO_CURVE: [f32; 4] = [1.0, 0.8, 0.6, 0.45];

/// Минимальная яркость вершины при освещении
pub const MIN_BRIGHTNESS: f32 = 0.05;

/// AO угла: два ребра + диагональ
#[inline]
pub fn corner_ao(side_a: bool, side_b: bool, corner: bool) -> f32 {
    AO_CURVE[side_a as usize + side_b as usize + corner as usize]
}

/// Свет 0..15 -> яркость с учётом AO
#[inline]
pub fn vertex_brightness(light: u8, ao: f32) -> f32 {
    (light.min(15) as f32 / 15.0 * ao).max(MIN_BRIGHTNESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ao_levels() {
        assert_eq!(corner_ao(false, false, false), 1.0);
        assert_eq!(corner_ao(true, false, false), 0.8);
        assert_eq!(corner_ao(true, false, true), 0.6);
        assert_eq!(corner_ao(true, true, true), 0.45);
    }

    #[test]
    fn test_brightness_floor() {
        assert_eq!(vertex_brightness(0, 1.0), MIN_BRIGHTNESS);
        assert_eq!(vertex_brightness(15, 1.0), 1.0);
        assert!((vertex_brightness(15, 0.45) - 0.45).abs() < 1e-6);
    }
}
