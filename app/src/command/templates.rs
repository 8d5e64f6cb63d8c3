use covmail_core::TemplateRegistry;

/// Strategy for listing the built-in templates with their markers and the
/// fields each one produces.
#[derive(Debug, Clone, Copy)]
pub struct TemplatesStrategy;

impl super::CommandStrategy for TemplatesStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let registry = TemplateRegistry::builtin()?;

        for template in registry.templates() {
            println!("{}", template.type_id());
            println!("  Markers ({}):", template.combinator().as_str());
            for marker in template.markers() {
                println!("    {marker}");
            }
            println!("  Fields: {}", template.declared_fields().join(", "));
            println!();
        }

        Ok(())
    }
}
