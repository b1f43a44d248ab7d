//! Built-in catalog of scene effects and filters known to the timeline.
//!
//! Names are the display names used by the desktop editor and by templates.

use serde::Serialize;

/// Metadata for one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectMeta {
    pub name: &'static str,
    pub resource_id: &'static str,
    /// Adjustable parameters, in application order
    pub params: &'static [&'static str],
}

const fn meta(
    name: &'static str,
    resource_id: &'static str,
    params: &'static [&'static str],
) -> EffectMeta {
    EffectMeta {
        name,
        resource_id,
        params,
    }
}

static SCENE_EFFECTS: &[EffectMeta] = &[
    meta("星火", "7009891437574885924", &["speed", "opacity"]),
    meta("波纹扭曲", "7057155543364342306", &["speed", "strength"]),
    meta("圣诞星光", "7041432018911351333", &["speed", "opacity", "sparkle"]),
    meta("金粉", "6979245689458897421", &["speed", "opacity"]),
    meta("闪白", "6706773500226392583", &["speed"]),
    meta("模糊", "6724848046640107016", &["blur"]),
    meta("老电影", "6706773515279741453", &["grain", "scratches"]),
    meta("胶片闪切", "7020405425427616293", &["speed"]),
    meta("下雨", "6898371138427048456", &["speed", "opacity"]),
    meta("爱心泡泡", "6896097716521652743", &["speed", "size"]),
];

static FILTERS: &[EffectMeta] = &[
    meta("高清", "7127641917036156167", &[]),
    meta("清晰", "7127655008715230495", &[]),
    meta("自然", "7127665432474341668", &[]),
    meta("暖食", "7127687436946575904", &[]),
    meta("黑白", "7127657919981342214", &[]),
    meta("胶片", "7127662318975487259", &[]),
    meta("复古", "7127689282410876197", &[]),
    meta("冷蓝", "7127690151982205448", &[]),
];

/// Lookup table for scene effects and filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectCatalog;

impl EffectCatalog {
    pub fn scene_effect(&self, name: &str) -> Option<&'static EffectMeta> {
        SCENE_EFFECTS.iter().find(|m| m.name == name)
    }

    pub fn filter(&self, name: &str) -> Option<&'static EffectMeta> {
        FILTERS.iter().find(|m| m.name == name)
    }

    pub fn scene_effects(&self) -> &'static [EffectMeta] {
        SCENE_EFFECTS
    }

    pub fn filters(&self) -> &'static [EffectMeta] {
        FILTERS
    }
}
