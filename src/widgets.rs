//! Presentational metadata for tag controls.
//!
//! These adapters only assemble names, classes and attributes. The values
//! they emit are the tokens [`Selection::decode`] parses back.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

use crate::models::Tag;
use crate::selection::{parse_token, AndOrSelection, Combinator, Selection, TagState};

pub const INC_EXC_CLASS: &str = "colortag-inc-exc";
pub const GROUP_CLASS: &str = "colortag-ie-group";
pub const CHOICE_CLASS: &str = "colortag-choice";
pub const AND_OR_CLASS: &str = "segmented-select sm and-or";

/// Suffix of the combinator checkbox name.
pub const USE_AND: &str = "use_and";

pub const OR_TOOLTIP: &str = "Show a result if it has ANY of the selected tags.\
    <br>(If a result has any of the tags to be excluded, it will not appear.)";
pub const AND_TOOLTIP: &str = "Show a result only if it has ALL of the selected tags.\
    <br>(If a result has any of the tags to be excluded, it will not appear.)";

pub type Attrs = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

fn attr_list(attrs: &Attrs) -> Vec<Attr> {
    attrs
        .iter()
        .map(|(name, value)| Attr {
            name: name.clone(),
            value: value.clone(),
        })
        .collect()
}

/// Rendering switches for a single tag.
#[derive(Debug, Clone, Default)]
pub struct TagOptions {
    pub no_tooltip: bool,
    pub tooltip_trigger: Option<String>,
    pub tooltip_placement: Option<String>,
    pub active: bool,
    pub button: bool,
    pub label: bool,
    pub size: Option<String>,
    /// Extra classes, space separated.
    pub class: Option<String>,
}

impl TagOptions {
    pub fn button() -> Self {
        Self {
            button: true,
            ..Default::default()
        }
    }
}

pub fn colortag_attrs(tag: &Tag, options: &TagOptions) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert("data-tagid".into(), tag.id.to_string());
    attrs.insert("data-tagslug".into(), tag.slug.clone());
    attrs.insert("data-background".into(), tag.color().to_string());

    if !options.no_tooltip && !tag.description.is_empty() {
        let trigger = options.tooltip_trigger.as_deref().unwrap_or("hover");
        let placement = options.tooltip_placement.as_deref().unwrap_or("top");
        attrs.insert("data-toggle".into(), "tooltip".into());
        attrs.insert("data-trigger".into(), trigger.into());
        attrs.insert("data-placement".into(), placement.into());
        attrs.insert("title".into(), tag.description.clone());
    }
    attrs
}

pub fn colortag_classes(tag: &Tag, options: &TagOptions) -> BTreeSet<String> {
    let mut classes = BTreeSet::from(["colortag".to_string()]);
    classes.insert(if tag.font_white() {
        "colortag-dark".into()
    } else {
        "colortag-light".into()
    });
    if options.active {
        classes.insert("colortag-active".into());
    }
    if options.button {
        classes.insert("btn".into());
    }
    if options.label {
        let size = options.size.as_deref().unwrap_or("xs");
        classes.insert("label".into());
        classes.insert(format!("label-{}", size));
    }
    if let Some(extra) = &options.class {
        classes.extend(extra.split(' ').filter(|c| !c.is_empty()).map(String::from));
    }
    classes
}

pub fn class_string(classes: &BTreeSet<String>) -> String {
    classes.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

/// A static badge for a tag.
#[derive(Debug, Clone, Serialize)]
pub struct TagBadge {
    pub name: String,
    pub class: String,
    pub style: String,
    pub attrs: Attrs,
}

impl TagBadge {
    pub fn new(tag: &Tag, options: &TagOptions) -> Self {
        Self {
            name: tag.name.clone(),
            class: class_string(&colortag_classes(tag, options)),
            style: format!("background-color: {}; color: {};", tag.color(), tag.font_color()),
            attrs: colortag_attrs(tag, options),
        }
    }

    pub fn label(tag: &Tag) -> Self {
        Self::new(
            tag,
            &TagOptions {
                label: true,
                ..Default::default()
            },
        )
    }

    pub fn attr_list(&self) -> Vec<Attr> {
        attr_list(&self.attrs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlOption {
    pub value: String,
    pub label: String,
    pub id: String,
    pub class: String,
    pub selected: bool,
}

/// Three radio options for one tag: ignore, include, exclude.
#[derive(Debug, Clone, Serialize)]
pub struct IncludeExcludeControl {
    pub name: String,
    pub class: String,
    pub style: String,
    pub attrs: Attrs,
    pub options: Vec<ControlOption>,
}

impl IncludeExcludeControl {
    pub fn new(prefix: &str, tag: &Tag, state: TagState) -> Self {
        let options = TagOptions::button();
        let tag_classes = class_string(&colortag_classes(tag, &options));
        let name = format!("{}_{}", prefix, tag.slug);
        let base_id = format!("id_{}", name);

        let option = |option_state: TagState, class: &str, suffix: &str| ControlOption {
            value: option_state.token(&tag.id),
            label: tag.name.clone(),
            id: format!("{}_{}", base_id, suffix),
            class: format!("{} {}", class, tag_classes),
            selected: option_state == state,
        };

        let mut attrs = colortag_attrs(tag, &options);
        attrs.insert("data-class".into(), tag_classes.clone());

        Self {
            class: INC_EXC_CLASS.to_string(),
            style: format!("--colortag-color: {};", tag.color()),
            options: vec![
                option(TagState::Absent, "inactive", "?"),
                option(TagState::Included, "include active", "i"),
                option(TagState::Excluded, "exclude active", "e"),
            ],
            name,
            attrs,
        }
    }

    pub fn selected(&self) -> Option<&ControlOption> {
        self.options.iter().find(|o| o.selected)
    }

    pub fn attr_list(&self) -> Vec<Attr> {
        attr_list(&self.attrs)
    }
}

/// The OR/AND checkbox. Checked means AND.
#[derive(Debug, Clone, Serialize)]
pub struct AndOrControl {
    pub name: String,
    pub class: String,
    pub checked: bool,
    pub or_tooltip: String,
    pub and_tooltip: String,
}

impl AndOrControl {
    pub fn new(prefix: &str, combinator: Combinator) -> Self {
        Self {
            name: format!("{}_{}", prefix, USE_AND),
            class: AND_OR_CLASS.to_string(),
            checked: combinator.is_and(),
            or_tooltip: OR_TOOLTIP.to_string(),
            and_tooltip: AND_TOOLTIP.to_string(),
        }
    }
}

/// The composite filter control: combinator plus one tri-state control per
/// tag, initialized from the current selection.
#[derive(Debug, Clone, Serialize)]
pub struct TagFilterWidget {
    pub class: String,
    pub and_or: AndOrControl,
    pub controls: Vec<IncludeExcludeControl>,
}

impl TagFilterWidget {
    pub fn new(prefix: &str, tags: &[Tag], value: &AndOrSelection<Uuid>) -> Self {
        Self {
            class: GROUP_CLASS.to_string(),
            and_or: AndOrControl::new(prefix, value.combinator),
            controls: tags
                .iter()
                .map(|tag| IncludeExcludeControl::new(prefix, tag, value.selection.state_of(&tag.id)))
                .collect(),
        }
    }

    /// The submitted values this widget would post as-is.
    pub fn submitted_tokens(&self) -> Vec<String> {
        self.controls
            .iter()
            .filter_map(|c| c.selected())
            .map(|o| o.value.clone())
            .collect()
    }
}

/// One checkbox of the plain multi-choice tag filter.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceOption {
    pub name: String,
    pub class: String,
    pub value: String,
    pub label: String,
    pub selected: bool,
    pub attrs: Attrs,
}

impl ChoiceOption {
    pub fn attr_list(&self) -> Vec<Attr> {
        attr_list(&self.attrs)
    }
}

pub fn choice_options(name: &str, tags: &[Tag], selected: &Selection<Uuid>) -> Vec<ChoiceOption> {
    let options = TagOptions::button();
    tags.iter()
        .map(|tag| {
            let mut attrs = colortag_attrs(tag, &options);
            attrs.insert("data-class".into(), class_string(&colortag_classes(tag, &options)));
            ChoiceOption {
                name: name.to_string(),
                class: CHOICE_CLASS.to_string(),
                value: tag.id.to_string(),
                label: tag.name.clone(),
                selected: selected.includes.contains(&tag.id),
                attrs,
            }
        })
        .collect()
}

/// Read the composite filter from flat submitted pairs.
///
/// The combinator comes from `<prefix>_use_and`; tokens come from `<prefix>`
/// and every `<prefix>_*` key, including `<prefix>_use_and` values that
/// parse as tokens.
pub fn decode_and_or<Id>(prefix: &str, pairs: &[(String, String)]) -> AndOrSelection<Id>
where
    Id: Ord + FromStr,
{
    let use_and = format!("{}_{}", prefix, USE_AND);
    let field_prefix = format!("{}_", prefix);

    // A tag slugged `use_and` shares the checkbox key; its tokens still count.
    let mut flag = None;
    let mut tokens = Vec::new();
    for (key, value) in pairs {
        if *key == use_and && !value.is_empty() && parse_token::<Id>(value).is_none() {
            flag.get_or_insert(value.as_str());
        } else if key == prefix || key.starts_with(&field_prefix) {
            tokens.push(value.as_str());
        }
    }

    let combinator = Combinator::from_form_value(flag);

    AndOrSelection {
        combinator,
        selection: Selection::decode(tokens),
    }
}

/// Read the plain multi-choice filter: every `<name>` value is a tag id.
pub fn decode_choices<Id>(name: &str, pairs: &[(String, String)]) -> Selection<Id>
where
    Id: Ord + FromStr,
{
    Selection::from_choices(
        pairs
            .iter()
            .filter(|(key, _)| key == name)
            .filter_map(|(_, value)| value.trim().parse().ok()),
    )
}
