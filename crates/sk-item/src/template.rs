use crate::effect::TemplateEffect;

#[derive(Debug, Clone)]
pub struct ItemApplicationTemplate {
    pub item_template_id: u32,
    pub effects: Vec<TemplateEffect>,
    pub cooldown_ms: u32,
}
