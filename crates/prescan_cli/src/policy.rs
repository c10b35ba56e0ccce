//! Classification policy driven by the `[policy]` section of `prescan.toml`.

use std::collections::HashSet;

use prescan_cache::ClassificationPolicy;
use prescan_classfile::TypeDescriptor;
use prescan_config::PolicyConfig;

/// Name and hierarchy rules read from configuration.
#[derive(Debug, Clone, Default)]
pub struct RulePolicy {
    ignore_prefixes: Vec<String>,
    transform_types: HashSet<String>,
    transform_prefixes: Vec<String>,
    transform_supertypes: HashSet<String>,
    transform_interfaces: HashSet<String>,
}

impl RulePolicy {
    /// Builds the rule set from the `[policy]` section.
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            ignore_prefixes: config.ignore_prefixes.clone(),
            transform_types: config.transform_types.iter().cloned().collect(),
            transform_prefixes: config.transform_prefixes.clone(),
            transform_supertypes: config.transform_supertypes.iter().cloned().collect(),
            transform_interfaces: config.transform_interfaces.iter().cloned().collect(),
        }
    }
}

impl ClassificationPolicy for RulePolicy {
    fn is_globally_ignored(&self, name: &str) -> bool {
        self.ignore_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    fn matches_any(&self, descriptor: &TypeDescriptor) -> bool {
        let name = descriptor.name.as_str();
        self.transform_types.contains(name)
            || self
                .transform_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
            || descriptor
                .super_name
                .as_deref()
                .is_some_and(|parent| self.transform_supertypes.contains(parent))
            || descriptor
                .interfaces
                .iter()
                .any(|interface| self.transform_interfaces.contains(interface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prescan_classfile::fixtures::ClassFixture;
    use prescan_classfile::parse_descriptor;

    fn policy() -> RulePolicy {
        RulePolicy::from_config(&PolicyConfig {
            ignore_prefixes: vec!["com.shaded.".to_string()],
            transform_types: vec!["com.example.Service".to_string()],
            transform_prefixes: vec!["com.example.web.".to_string()],
            transform_supertypes: vec!["javax.servlet.http.HttpServlet".to_string()],
            transform_interfaces: vec!["java.sql.Statement".to_string()],
        })
    }

    fn describe(fixture: ClassFixture) -> TypeDescriptor {
        parse_descriptor(&fixture.build()).unwrap()
    }

    #[test]
    fn ignore_by_prefix() {
        let policy = policy();
        assert!(policy.is_globally_ignored("com.shaded.guava.Lists"));
        assert!(!policy.is_globally_ignored("com.example.Service"));
    }

    #[test]
    fn transform_by_exact_name() {
        assert!(policy().matches_any(&describe(ClassFixture::new("com/example/Service"))));
        assert!(!policy().matches_any(&describe(ClassFixture::new("com/example/ServiceImpl"))));
    }

    #[test]
    fn transform_by_prefix() {
        assert!(policy().matches_any(&describe(ClassFixture::new("com/example/web/Controller"))));
    }

    #[test]
    fn transform_by_supertype() {
        let servlet = ClassFixture::new("app/Home").super_name("javax/servlet/http/HttpServlet");
        assert!(policy().matches_any(&describe(servlet)));
    }

    #[test]
    fn transform_by_interface() {
        let statement = ClassFixture::new("db/Wrapped")
            .interface("java/lang/AutoCloseable")
            .interface("java/sql/Statement");
        assert!(policy().matches_any(&describe(statement)));
    }

    #[test]
    fn no_rule_matches() {
        assert!(!policy().matches_any(&describe(ClassFixture::new("app/Plain"))));
    }

    #[test]
    fn empty_policy_skips_everything() {
        let policy = RulePolicy::from_config(&PolicyConfig::default());
        assert!(!policy.is_globally_ignored("anything.At.All"));
        assert!(!policy.matches_any(&describe(ClassFixture::new("app/Plain"))));
    }
}
