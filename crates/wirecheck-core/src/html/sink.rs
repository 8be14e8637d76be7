use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{Tag, TagKind, Token, TokenSink, TokenSinkResult};
use tracing::debug;

use super::locator::SourceLocator;
use super::{EVENT_ATTRIBUTES, INTERACTIVE_ROLES};
use crate::model::{ElementRegistry, ElementRegistryBuilder, EventHandlerRecord, FormRecord, InteractiveElementRecord};

/// Token sink that fills an [`ElementRegistryBuilder`] as tags stream past.
pub(crate) struct ElementCollector {
    locator: SourceLocator,
    builder: ElementRegistryBuilder,
    forms: Vec<FormRecord>,
    open_forms: Vec<usize>,
}

impl ElementCollector {
    pub fn new(source: &str) -> Self {
        Self {
            locator: SourceLocator::new(source),
            builder: ElementRegistry::builder(),
            forms: Vec::new(),
            open_forms: Vec::new(),
        }
    }

    pub fn finish(mut self) -> ElementRegistry {
        for form in self.forms {
            self.builder.form(form);
        }
        self.builder.line_count(self.locator.line_count());
        self.builder.build()
    }

    fn start_tag(&mut self, tag: &Tag, token_line: usize) -> Option<RawKind> {
        let name: &str = &tag.name;
        let line = self.locator.start_tag(name, token_line);
        let id = attr(tag, "id").map(str::trim).filter(|id| !id.is_empty());

        if let Some(id) = id {
            self.builder.element_id(id, line);
        }

        let mut has_handler = false;
        for attribute in &tag.attrs {
            let attr_name: &str = &attribute.name.local;
            if !EVENT_ATTRIBUTES.contains(&attr_name) {
                continue;
            }
            has_handler = true;

            let value = attribute.value.trim();
            if value.is_empty() {
                continue;
            }
            self.builder.event_handler(EventHandlerRecord {
                element_id: id.map(str::to_string),
                event_type: attr_name.to_string(),
                function_call: value.to_string(),
                line_number: line,
            });
        }

        let inside_form = !self.open_forms.is_empty();
        if let Some(role) = interactive_role(tag, inside_form) {
            self.builder.interactive_element(InteractiveElementRecord {
                element_id: id.map(str::to_string),
                tag_name: name.to_string(),
                role,
                has_event_handler: has_handler,
                line_number: line,
            });
        }

        self.track_form(tag, id, line);

        match name {
            "script" => Some(RawKind::ScriptData),
            "style" => Some(RawKind::Rawtext),
            "textarea" | "title" => Some(RawKind::Rcdata),
            _ => None,
        }
    }

    fn end_tag(&mut self, tag: &Tag, token_line: usize) {
        let name: &str = &tag.name;
        self.locator.end_tag(name, token_line);
        if name == "form" {
            self.open_forms.pop();
        }
    }

    fn track_form(&mut self, tag: &Tag, id: Option<&str>, line: usize) {
        let name: &str = &tag.name;
        if name == "form" {
            self.open_forms.push(self.forms.len());
            self.forms.push(FormRecord {
                element_id: id.map(str::to_string),
                line_number: line,
                label_targets: Vec::new(),
                has_submit_control: false,
            });
            return;
        }

        let Some(form) = self.open_forms.last().and_then(|&i| self.forms.get_mut(i)) else {
            return;
        };

        match name {
            "label" => {
                if let Some(target) = attr(tag, "for").map(str::trim).filter(|t| !t.is_empty()) {
                    form.label_targets.push(target.to_string());
                }
            }
            "button" | "input" if is_submit_control(tag) => form.has_submit_control = true,
            _ => {}
        }
    }
}

impl TokenSink for ElementCollector {
    type Handle = ();

    fn process_token(&mut self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        let line = line_number as usize;
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => {
                    if let Some(kind) = self.start_tag(&tag, line) {
                        return TokenSinkResult::RawData(kind);
                    }
                }
                TagKind::EndTag => self.end_tag(&tag, line),
            },
            Token::CommentToken(_) => self.locator.comment(line),
            Token::ParseError(message) => {
                debug!(line, "html parse error: {}", message);
                self.builder.diagnostic(line, message.into_owned());
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

fn attr<'t>(tag: &'t Tag, name: &str) -> Option<&'t str> {
    tag.attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| &*a.value)
}

fn input_type(tag: &Tag) -> String {
    attr(tag, "type")
        .map(|t| t.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

fn is_submit_control(tag: &Tag) -> bool {
    let name: &str = &tag.name;
    let kind = input_type(tag);
    match name {
        "button" => kind.is_empty() || kind == "submit",
        "input" => kind == "submit" || kind == "image",
        _ => false,
    }
}

/// Whether the tag is an interactive element that needs wiring, and the
/// role it was recognized by. `Some(None)` means recognized by tag name.
fn interactive_role(tag: &Tag, inside_form: bool) -> Option<Option<String>> {
    let name: &str = &tag.name;

    if let Some(role) = attr(tag, "role").map(|r| r.trim().to_ascii_lowercase()) {
        if INTERACTIVE_ROLES.contains(&role.as_str()) {
            return Some(Some(role));
        }
    }

    let needs_wiring = match name {
        // Submit and reset controls inside a form act without script.
        "button" | "input" if inside_form && is_native_form_action(tag) => false,
        "button" | "select" | "textarea" => true,
        "input" => input_type(tag) != "hidden",
        "a" => attr(tag, "href").is_some(),
        _ => false,
    };

    needs_wiring.then_some(None)
}

fn is_native_form_action(tag: &Tag) -> bool {
    is_submit_control(tag) || input_type(tag) == "reset"
}

