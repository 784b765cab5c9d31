//! Weekly class schedule (emploi du temps).
//!
//! The grid is a single JSON document kept in the settings table. Changing it
//! is a write, so it goes through the same role check as any record.

use shared::{AddSessionRequest, ReportTable, ScheduleGrid, ScheduleSession};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::{DomainResult, ValidationErrors};
use super::validation::REQUIRED;
use crate::storage::RecordStore;

pub const SCHEDULE_KEY: &str = "schedule.grid";
pub const DAYS: [&str; 6] = ["Samedi", "Dimanche", "Lundi", "Mardi", "Mercredi", "Jeudi"];
pub const DEFAULT_HOURS: [&str; 4] = ["08:00 - 10:00", "10:00 - 12:00", "13:00 - 15:00", "15:00 - 17:00"];

pub fn default_grid() -> ScheduleGrid {
    ScheduleGrid {
        days: DAYS.iter().map(|d| d.to_string()).collect(),
        hours: DEFAULT_HOURS.iter().map(|h| h.to_string()).collect(),
        sessions: Default::default(),
    }
}

fn check_grid(grid: &ScheduleGrid) -> DomainResult<()> {
    let mut errors = ValidationErrors::new();
    if grid.hours.iter().any(|h| h.trim().is_empty()) {
        errors.add("hours", REQUIRED);
    }
    for (day, slots) in &grid.sessions {
        if !grid.days.contains(day) {
            errors.add("day", format!("unknown day '{}'", day));
        }
        for hour in slots.keys() {
            if !grid.hours.contains(hour) {
                errors.add("hour", format!("unknown time slot '{}'", hour));
            }
        }
    }
    errors.into_result()
}

fn check_session(session: &ScheduleSession) -> DomainResult<()> {
    let mut errors = ValidationErrors::new();
    if session.teacher.trim().is_empty() {
        errors.add("teacher", REQUIRED);
    }
    if session.class_name.trim().is_empty() {
        errors.add("class", REQUIRED);
    }
    errors.into_result()
}

/// Lay the grid out as a table: one row per time slot, one column per day
pub fn grid_table(grid: &ScheduleGrid, generated_on: &str) -> ReportTable {
    let mut headers = vec!["Heure/Jour".to_string()];
    headers.extend(grid.days.iter().cloned());

    let rows = grid
        .hours
        .iter()
        .map(|hour| {
            let mut row = vec![hour.clone()];
            for day in &grid.days {
                let sessions = grid
                    .sessions
                    .get(day)
                    .and_then(|slots| slots.get(hour))
                    .filter(|s| !s.is_empty());
                row.push(match sessions {
                    Some(sessions) => sessions
                        .iter()
                        .map(|s| format!("{}\n{}\nSalle: {}", s.teacher, s.class_name, s.room))
                        .collect::<Vec<_>>()
                        .join("\n---\n"),
                    None => String::new(),
                });
            }
            row
        })
        .collect();

    ReportTable {
        title: "Emploi du temps".to_string(),
        generated_on: generated_on.to_string(),
        headers,
        rows,
    }
}

#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn RecordStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The saved grid, or an empty grid with the default days and hours
    pub async fn load(&self) -> DomainResult<ScheduleGrid> {
        match self.store.get_setting(SCHEDULE_KEY).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(grid) => Ok(grid),
                Err(e) => {
                    warn!("Stored schedule is unreadable, starting from defaults: {}", e);
                    Ok(default_grid())
                }
            },
            None => Ok(default_grid()),
        }
    }

    pub async fn save(&self, grid: ScheduleGrid) -> DomainResult<ScheduleGrid> {
        info!("Saving schedule with {} time slots", grid.hours.len());
        check_grid(&grid)?;
        let raw = serde_json::to_string(&grid)?;
        self.store.put_setting(SCHEDULE_KEY, &raw).await?;
        Ok(grid)
    }

    pub async fn add_session(&self, request: AddSessionRequest) -> DomainResult<ScheduleGrid> {
        info!("Adding session on {} at {}", request.day, request.hour);
        check_session(&request.session)?;

        let mut grid = self.load().await?;
        grid.sessions
            .entry(request.day)
            .or_default()
            .entry(request.hour)
            .or_default()
            .push(request.session);
        self.save(grid).await
    }

    /// Remove the `index`th session of a cell. Out-of-range indexes change nothing.
    pub async fn remove_session(&self, day: &str, hour: &str, index: usize) -> DomainResult<ScheduleGrid> {
        info!("Removing session {} on {} at {}", index, day, hour);

        let mut grid = self.load().await?;
        if let Some(slots) = grid.sessions.get_mut(day) {
            if let Some(sessions) = slots.get_mut(hour) {
                if index < sessions.len() {
                    sessions.remove(index);
                }
                if sessions.is_empty() {
                    slots.remove(hour);
                }
            }
            if slots.is_empty() {
                grid.sessions.remove(day);
            }
        }
        self.save(grid).await
    }

    /// Replace the time slots. Sessions booked in a slot that no longer exists are dropped.
    pub async fn set_hours(&self, hours: Vec<String>) -> DomainResult<ScheduleGrid> {
        info!("Setting {} time slots", hours.len());

        let mut grid = self.load().await?;
        grid.hours = hours.into_iter().map(|h| h.trim().to_string()).collect();
        for slots in grid.sessions.values_mut() {
            slots.retain(|hour, _| grid.hours.contains(hour));
        }
        grid.sessions.retain(|_, slots| !slots.is_empty());
        self.save(grid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::test_support::{secretary_store, store_as};
    use crate::storage::StoreError;
    use shared::Role;

    fn session(teacher: &str) -> ScheduleSession {
        ScheduleSession {
            teacher: teacher.to_string(),
            class_name: "1ère année".to_string(),
            room: "A1".to_string(),
        }
    }

    fn add(day: &str, hour: &str, teacher: &str) -> AddSessionRequest {
        AddSessionRequest {
            day: day.to_string(),
            hour: hour.to_string(),
            session: session(teacher),
        }
    }

    #[tokio::test]
    async fn test_default_grid_when_nothing_saved() {
        let service = ScheduleService::new(secretary_store());
        let grid = service.load().await.unwrap();
        assert_eq!(grid.days[0], "Samedi");
        assert_eq!(grid.hours.len(), 4);
        assert!(grid.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_add_and_remove_sessions() {
        let service = ScheduleService::new(secretary_store());
        service.add_session(add("Lundi", "08:00 - 10:00", "M. Dupont")).await.unwrap();
        let grid = service.add_session(add("Lundi", "08:00 - 10:00", "M. Ahmed")).await.unwrap();
        assert_eq!(grid.sessions["Lundi"]["08:00 - 10:00"].len(), 2);

        let grid = service.remove_session("Lundi", "08:00 - 10:00", 0).await.unwrap();
        assert_eq!(grid.sessions["Lundi"]["08:00 - 10:00"], vec![session("M. Ahmed")]);

        let grid = service.remove_session("Lundi", "08:00 - 10:00", 0).await.unwrap();
        assert!(grid.sessions.is_empty());
        assert_eq!(service.load().await.unwrap(), grid);
    }

    #[tokio::test]
    async fn test_unknown_cell_is_rejected() {
        let service = ScheduleService::new(secretary_store());
        let result = service.add_session(add("Vendredi", "08:00 - 10:00", "M. Dupont")).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_set_hours_drops_orphaned_sessions() {
        let service = ScheduleService::new(secretary_store());
        service.add_session(add("Mardi", "13:00 - 15:00", "Mme. Martin")).await.unwrap();
        service.add_session(add("Mardi", "08:00 - 10:00", "M. Dupont")).await.unwrap();

        let grid = service
            .set_hours(vec!["08:00 - 10:00".to_string(), " 09:00 - 11:00 ".to_string()])
            .await
            .unwrap();
        assert_eq!(grid.hours[1], "09:00 - 11:00");
        assert_eq!(grid.sessions["Mardi"].len(), 1);

        let table = grid_table(&grid, "2024-12-31");
        assert_eq!(table.headers.len(), 7);
        assert_eq!(table.rows[0][3], "");
        assert_eq!(table.rows[0][4], "M. Dupont\n1ère année\nSalle: A1");
    }

    #[tokio::test]
    async fn test_director_cannot_edit_schedule() {
        let (store, _raw, _session) = store_as(Role::Director);
        let service = ScheduleService::new(store);
        let result = service.add_session(add("Lundi", "08:00 - 10:00", "M. Dupont")).await;
        assert!(matches!(result, Err(DomainError::Store(StoreError::PermissionDenied { .. }))));
    }
}
