//! 班级颜色分配
//!
//! 色相取标题 SHA-256 摘要（按大端整数）对 360 取模。已被占用时依次尝试后续色相，
//! 360 种全部占用后随机复用一个已有颜色。

use rand::Rng;
use rand::seq::IteratorRandom;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::config::AppConfig;

const HUES: u32 = 360;

/// 标题对应的色相
pub fn hue_for(identifier: &str) -> u32 {
    let digest = Sha256::digest(identifier.as_bytes());
    // 大端整数逐字节取模
    digest
        .iter()
        .fold(0u32, |acc, byte| (acc * 256 + u32::from(*byte)) % HUES)
}

pub fn format_hsl(hue: u32, saturation: u8, lightness: u8) -> String {
    format!("hsl({hue}, {saturation}%, {lightness}%)")
}

/// 使用给定饱和度和亮度生成颜色
pub fn hsl_color_with(identifier: &str, saturation: u8, lightness: u8) -> String {
    format_hsl(hue_for(identifier), saturation, lightness)
}

/// 使用配置中的饱和度和亮度生成颜色
pub fn hsl_color(identifier: &str) -> String {
    let config = &AppConfig::get().color;
    hsl_color_with(identifier, config.saturation, config.lightness)
}

/// 为标题分配一个未被占用的颜色
pub fn assign_color<R: Rng + ?Sized>(
    rng: &mut R,
    title: &str,
    used: &HashSet<String>,
    saturation: u8,
    lightness: u8,
) -> String {
    let start = hue_for(title);
    for offset in 0..HUES {
        let candidate = format_hsl((start + offset) % HUES, saturation, lightness);
        if !used.contains(&candidate) {
            return candidate;
        }
    }

    // 全部占用，随机复用
    used.iter()
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| format_hsl(start, saturation, lightness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_hue_is_stable_and_in_range() {
        let a = hue_for("English 101");
        assert_eq!(a, hue_for("English 101"));
        assert!(a < 360);
    }

    #[test]
    fn test_hue_matches_big_endian_modulo() {
        // "abc" 的摘要 ba7816bf...15ad，按大端整数对 360 取模
        let digest = Sha256::digest(b"abc");
        let expected = digest
            .iter()
            .fold(0u128, |acc, b| (acc * 256 + u128::from(*b)) % 360) as u32;
        assert_eq!(hue_for("abc"), expected);
    }

    #[test]
    fn test_format() {
        assert_eq!(hsl_color_with("x", 100, 30), format!("hsl({}, 100%, 30%)", hue_for("x")));
    }

    #[test]
    fn test_assign_free_color() {
        let mut rng = StdRng::seed_from_u64(7);
        let used = HashSet::new();
        assert_eq!(
            assign_color(&mut rng, "English 101", &used, 100, 30),
            hsl_color_with("English 101", 100, 30)
        );
    }

    #[test]
    fn test_assign_probes_next_hue() {
        let mut rng = StdRng::seed_from_u64(7);
        let base = hue_for("English 101");
        let used: HashSet<String> = [format_hsl(base, 100, 30)].into_iter().collect();
        let color = assign_color(&mut rng, "English 101", &used, 100, 30);
        assert_eq!(color, format_hsl((base + 1) % 360, 100, 30));
    }

    #[test]
    fn test_sequential_titles_never_collide() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut used = HashSet::new();
        for _ in 0..20 {
            // 同名标题也必须得到不同颜色
            let color = assign_color(&mut rng, "Same Title", &used, 100, 30);
            assert!(used.insert(color));
        }
    }

    #[test]
    fn test_exhausted_palette_reuses_existing() {
        let mut rng = StdRng::seed_from_u64(3);
        let used: HashSet<String> = (0..360).map(|h| format_hsl(h, 100, 30)).collect();
        let color = assign_color(&mut rng, "Advanced English", &used, 100, 30);
        assert!(used.contains(&color));
    }
}
