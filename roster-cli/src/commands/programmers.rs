use anyhow::{Context, Result};
use roster::domain::models::{Npm, ProgrammerForm, ProgrammerProfile};
use roster::domain::ports::outbound::{AuthClient, KeyValueStore, TableStore};
use roster::domain::RecordError;

use crate::app::App;
use crate::cli::ProgrammerCommand;
use crate::prompt::confirm;

pub async fn run<S: TableStore, K: KeyValueStore, A: AuthClient>(
    app: &App<S, K, A>,
    command: ProgrammerCommand,
) -> Result<()> {
    let mut directory = app.directory();

    match command {
        ProgrammerCommand::List { search, specialty } => {
            directory
                .reload(&search, specialty.as_deref())
                .await
                .context("Failed to load programmers")?;
            if directory.programmers().is_empty() {
                println!("No programmers found.");
            }
            for programmer in directory.programmers() {
                println!("{}", format_programmer(programmer));
            }
            let specialties = directory.specialties();
            if !specialties.is_empty() {
                println!("\nSpecialties: {}", specialties.join(", "));
            }
        }
        ProgrammerCommand::Add {
            npm,
            name,
            phone,
            specialty,
            region,
        } => {
            let form = ProgrammerForm {
                npm,
                name,
                phone,
                specialty,
                region,
            };
            directory.create(&form).await?;
            println!("Programmer added.");
        }
        ProgrammerCommand::Edit {
            npm,
            new_npm,
            name,
            phone,
            specialty,
            region,
        } => {
            directory
                .reload("", None)
                .await
                .context("Failed to load programmers")?;
            let existing = directory
                .find(Npm::new(npm))
                .ok_or(RecordError::NotFound(npm))?;

            let mut form = ProgrammerForm::from_profile(existing);
            for (field, value) in [
                (&mut form.npm, new_npm),
                (&mut form.name, name),
                (&mut form.phone, phone),
                (&mut form.specialty, specialty),
                (&mut form.region, region),
            ] {
                if let Some(value) = value {
                    *field = value;
                }
            }

            directory.update(Npm::new(npm), &form).await?;
            println!("Programmer {npm} updated.");
        }
        ProgrammerCommand::Remove { npm, yes } => {
            if !yes && !confirm(&format!("Remove programmer {npm}?"))? {
                println!("Cancelled.");
                return Ok(());
            }
            directory.remove(Npm::new(npm)).await?;
            println!("Programmer {npm} removed.");
        }
    }
    Ok(())
}

fn format_programmer(programmer: &ProgrammerProfile) -> String {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    format!(
        "{:>8}  {:<24} {:<14} {:<12} {}",
        programmer.npm.as_i64(),
        programmer.name,
        optional(&programmer.phone),
        optional(&programmer.specialty),
        optional(&programmer.region)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_render_as_dash() {
        let programmer = ProgrammerProfile {
            npm: Npm::new(5003),
            name: "Citra".to_string(),
            phone: None,
            specialty: Some("Frontend".to_string()),
            region: None,
            created_at: None,
        };
        let line = format_programmer(&programmer);
        assert!(line.starts_with("    5003  Citra"));
        assert!(line.contains("Frontend"));
        assert!(line.ends_with(" -"));
    }
}
