use anyhow::{bail, Context, Result};
use roster::domain::models::{Npm, StandbyAssignment, StandbyForm, StandbyId};
use roster::domain::ports::outbound::{AuthClient, KeyValueStore, TableStore};
use roster::domain::services::StandbySchedule;
use roster::domain::{today, CalendarMode, CalendarView, ProgrammerNames};

use crate::app::App;
use crate::cli::StandbyCommand;
use crate::prompt::confirm;

pub async fn run<S: TableStore, K: KeyValueStore, A: AuthClient>(
    app: &App<S, K, A>,
    command: StandbyCommand,
) -> Result<()> {
    match command {
        StandbyCommand::List {
            mode,
            month,
            anchor,
            offset,
        } => {
            let mode = if month { CalendarMode::Month } else { mode };
            let mut calendar = CalendarView::new(anchor.unwrap_or_else(today), mode, app.locale);
            for _ in 0..offset.unsigned_abs() {
                if offset > 0 {
                    calendar.next()?;
                } else {
                    calendar.previous()?;
                }
            }

            let mut schedule = app.schedule(calendar);
            schedule
                .reload()
                .await
                .context("Failed to load standby schedule")?;
            print_schedule(&schedule)
        }
        StandbyCommand::Add(args) => {
            let form = StandbyForm {
                programmer: Some(Npm::new(args.npm)),
                date: Some(args.date),
                start: args.start,
                end: args.end,
            };
            let mut schedule = app.schedule(CalendarView::new(
                args.date,
                CalendarMode::Week,
                app.locale,
            ));
            schedule.create(&form).await?;
            println!(
                "Added standby for {} on {}.",
                schedule.names().name_of(Npm::new(args.npm)),
                args.date
            );
            Ok(())
        }
        StandbyCommand::Edit { id, fields } => {
            let mut schedule = app.schedule(CalendarView::new(
                today(),
                CalendarMode::Week,
                app.locale,
            ));
            schedule
                .reload()
                .await
                .context("Failed to load standby schedule")?;
            let Some(existing) = schedule
                .assignments()
                .iter()
                .find(|a| a.id == StandbyId::new(id))
            else {
                bail!("No standby assignment with id {id}");
            };

            let mut form = StandbyForm::from_assignment(existing);
            if let Some(npm) = fields.npm {
                form.programmer = Some(Npm::new(npm));
            }
            if fields.date.is_some() {
                form.date = fields.date;
            }
            if let Some(start) = fields.start {
                form.start = start;
            }
            if let Some(end) = fields.end {
                form.end = end;
            }

            schedule.update(StandbyId::new(id), &form).await?;
            println!("Updated standby assignment {id}.");
            Ok(())
        }
        StandbyCommand::Remove { id, yes } => {
            if !yes && !confirm(&format!("Remove standby assignment {id}?"))? {
                println!("Cancelled.");
                return Ok(());
            }
            let mut schedule = app.schedule(CalendarView::new(
                today(),
                CalendarMode::Week,
                app.locale,
            ));
            schedule.remove(StandbyId::new(id)).await?;
            println!("Removed standby assignment {id}.");
            Ok(())
        }
    }
}

fn print_schedule<S: TableStore, K: KeyValueStore>(
    schedule: &StandbySchedule<S, K>,
) -> Result<()> {
    let window = schedule.calendar().window()?;
    let visible = schedule.visible()?;
    let names = schedule.names();

    println!("{window}");
    if visible.is_empty() {
        println!("  No standby scheduled.");
    }
    for assignment in visible {
        println!("  {}", format_assignment(assignment, &names));
    }
    Ok(())
}

fn format_assignment(assignment: &StandbyAssignment, names: &ProgrammerNames) -> String {
    format!(
        "{} {}-{}  {} (#{})",
        assignment.date,
        assignment.start_time.hh_mm(),
        assignment.end_time.hh_mm(),
        names.name_of(assignment.programmer),
        assignment.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster::domain::models::ProgrammerProfile;
    use roster::domain::CanonicalTime;
    use time::macros::date;

    #[test]
    fn assignment_line_shows_times_and_name() {
        let names = ProgrammerNames::new(&[ProgrammerProfile {
            npm: Npm::new(5001),
            name: "Ayu".to_string(),
            phone: None,
            specialty: None,
            region: None,
            created_at: None,
        }]);
        let assignment = StandbyAssignment {
            id: StandbyId::new(3),
            programmer: Npm::new(5001),
            date: date!(2024 - 03 - 04),
            start_time: CanonicalTime::parse("22:00:00").unwrap(),
            end_time: CanonicalTime::parse("06:00:00").unwrap(),
            created_at: None,
        };

        assert_eq!(
            format_assignment(&assignment, &names),
            "2024-03-04 22:00-06:00  Ayu (#3)"
        );
    }
}
