//! Compile-time text with typed placeholder substitution.

use std::marker::PhantomData;

/// Values substituted into a [`Template`].
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Embedded text that can only be rendered with its own variable type.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }

    pub const fn content(&self) -> &'static str {
        self.content
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeting<'a> {
        name: &'a str,
    }

    impl TemplateVars for Greeting<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__NAME__", self.name)
        }
    }

    #[test]
    fn test_render_replaces_every_placeholder() {
        const T: Template<Greeting<'static>> = Template::new("hi __NAME__, bye __NAME__");
        assert_eq!(T.render(&Greeting { name: "kiln" }), "hi kiln, bye kiln");
        assert_eq!(T.content(), "hi __NAME__, bye __NAME__");
    }
}
