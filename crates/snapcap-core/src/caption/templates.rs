//! Named-slot caption templates and the static template sets.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// Slot names understood by the caption templates.
pub mod slot {
    pub const ARTICLE: &str = "article";
    pub const MAIN: &str = "main";
    pub const ARTICLE2: &str = "article2";
    pub const SECONDARY: &str = "secondary";
    pub const TERTIARY: &str = "tertiary";
    pub const CONTEXT: &str = "context";
}

/// Values bound to template slots for one rendering.
#[derive(Debug, Default, Clone)]
pub struct SlotValues<'a> {
    values: BTreeMap<&'static str, &'a str>,
}

impl<'a> SlotValues<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `slot`, replacing any earlier binding.
    pub fn with(mut self, slot: &'static str, value: &'a str) -> Self {
        self.values.insert(slot, value);
        self
    }

    pub fn get(&self, slot: &str) -> Option<&'a str> {
        self.values.get(slot).copied()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'t> {
    Literal(&'t str),
    Slot(&'t str),
}

/// A caption pattern such as `"{article} {main} in the wild"`.
///
/// `{name}` is replaced by the slot value; `{{` and `}}` produce literal
/// braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template(&'static str);

impl Template {
    pub const fn new(pattern: &'static str) -> Self {
        Self(pattern)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Slot names in the order they appear.
    pub fn slots(&self) -> Result<Vec<&'static str>, TemplateError> {
        Ok(self
            .segments()?
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Slot(name) => Some(name),
                Segment::Literal(_) => None,
            })
            .collect())
    }

    /// Fill every slot from `values`.
    pub fn render(&self, values: &SlotValues<'_>) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.0.len() + 16);
        for segment in self.segments()? {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(name) => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| TemplateError::UnknownSlot(name.to_string()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    fn segments(&self) -> Result<Vec<Segment<'static>>, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = self.0;

        while let Some(pos) = rest.find(|c: char| c == '{' || c == '}') {
            if pos > 0 {
                segments.push(Segment::Literal(&rest[..pos]));
            }
            let tail = &rest[pos..];

            if tail.starts_with("{{") || tail.starts_with("}}") {
                segments.push(Segment::Literal(&tail[..1]));
                rest = &tail[2..];
            } else if tail.starts_with('}') {
                // A lone closing brace is kept as text
                segments.push(Segment::Literal(&tail[..1]));
                rest = &tail[1..];
            } else {
                let end = tail
                    .find('}')
                    .ok_or_else(|| TemplateError::Unterminated(self.0.to_string()))?;
                segments.push(Segment::Slot(&tail[1..end]));
                rest = &tail[end + 1..];
            }
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }
        Ok(segments)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Caption strategy a template set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    NatureAnimal,
    OutdoorScene,
    Urban,
    Objects,
    Single,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::NatureAnimal,
        Strategy::OutdoorScene,
        Strategy::Urban,
        Strategy::Objects,
        Strategy::Single,
    ];

    /// Slots a caller must bind when rendering this strategy's templates.
    pub fn slots(&self) -> &'static [&'static str] {
        match self {
            Strategy::NatureAnimal => &[slot::ARTICLE, slot::MAIN, slot::ARTICLE2, slot::CONTEXT],
            Strategy::OutdoorScene => &[slot::ARTICLE, slot::MAIN, slot::SECONDARY],
            Strategy::Urban => &[slot::ARTICLE, slot::MAIN],
            Strategy::Objects => &[slot::ARTICLE, slot::MAIN, slot::SECONDARY, slot::CONTEXT],
            Strategy::Single => &[slot::ARTICLE, slot::MAIN],
        }
    }
}

/// Alternative wordings for one strategy.
#[derive(Debug)]
pub struct TemplateSet {
    pub strategy: Strategy,
    pub templates: &'static [Template],
}

impl TemplateSet {
    pub fn for_strategy(strategy: Strategy) -> &'static TemplateSet {
        match strategy {
            Strategy::NatureAnimal => &NATURE_ANIMAL,
            Strategy::OutdoorScene => &OUTDOOR_SCENE,
            Strategy::Urban => &URBAN,
            Strategy::Objects => &OBJECTS,
            Strategy::Single => &SINGLE,
        }
    }
}

pub static NATURE_ANIMAL: TemplateSet = TemplateSet {
    strategy: Strategy::NatureAnimal,
    templates: &[
        Template::new("{article} {main} in {article2} natural setting"),
        Template::new("{article} beautiful {main} captured in this photo"),
        Template::new("{article} {main} {context}"),
        Template::new("{article} {main} in the wild"),
    ],
};

pub static OUTDOOR_SCENE: TemplateSet = TemplateSet {
    strategy: Strategy::OutdoorScene,
    templates: &[
        Template::new("{article} scenic view of {main}"),
        Template::new("{article} beautiful {main} landscape"),
        Template::new("{main} with {secondary} in the background"),
        Template::new("{article} picturesque {main} scene"),
    ],
};

pub static URBAN: TemplateSet = TemplateSet {
    strategy: Strategy::Urban,
    templates: &[
        Template::new("{article} {main} in an urban environment"),
        Template::new("{main} architecture captured in this photo"),
        Template::new("{article} modern {main}"),
    ],
};

pub static OBJECTS: TemplateSet = TemplateSet {
    strategy: Strategy::Objects,
    templates: &[
        Template::new("{article} {main} with {secondary}"),
        Template::new("{article} photo featuring {main}"),
        Template::new("{article} {main} {context}"),
    ],
};

pub static SINGLE: TemplateSet = TemplateSet {
    strategy: Strategy::Single,
    templates: &[
        Template::new("{article} {main}"),
        Template::new("{article} {main} in the photo"),
        Template::new("this image shows {article} {main}"),
    ],
};

/// Fixed wordings used by the deterministic policy branches.
pub mod phrase {
    use super::Template;

    pub const PAIR_IN_SCENE: Template =
        Template::new("{article} {main} with {article2} {secondary} in the scene");
    pub const PAIR_NEARBY: Template = Template::new("{article} {main} with {article2} {secondary} nearby");
    pub const PAIR_PHOTO: Template =
        Template::new("{article} photo of {article} {main} and {article2} {secondary}");
    pub const WITH_CONTEXT: Template = Template::new("{article} {main} {context}");
    pub const FEATURING: Template = Template::new("an image featuring {main}, {secondary}, and {tertiary}");
    pub const FALLBACK: Template = Template::new("{article} {main}");
}
