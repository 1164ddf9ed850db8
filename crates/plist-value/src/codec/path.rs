//! RFC 6901 pointer rendering for codec error locations.

/// Escapes one pointer token component.
fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Location of the value currently being encoded or decoded.
#[derive(Debug, Default, Clone)]
pub(crate) struct Path {
    steps: Vec<String>,
}

impl Path {
    pub(crate) fn push_key(&mut self, key: &str) {
        self.steps.push(escape_component(key));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.steps.push(index.to_string());
    }

    pub(crate) fn pop(&mut self) {
        self.steps.pop();
    }

    pub(crate) fn render(&self) -> String {
        if self.steps.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for step in &self.steps {
            out.push('/');
            out.push_str(step);
        }
        out
    }
}
