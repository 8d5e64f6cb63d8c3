use covmail_config::{Environment, SiteList};

/// Strategy for creating a site list.
///
/// Writes a template `site_list_prod.json` (or `site_list_dev.json`) to
/// `~/covmail` and refuses to overwrite an existing one.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = Environment;

    async fn execute(&self, env: Self::Input) -> anyhow::Result<()> {
        let path = SiteList::create_template(env)?;

        println!("✅ Created site list at: {}", path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Add one entry per site with Site_Name, Email_Account and Folder_Path");
        println!("   2. Export each account's folder under a mailbox directory");
        println!("   3. Run 'covmail run --mailbox <dir>' to extract the results");
        println!();
        Ok(())
    }
}
