use chrono::Local;
use shared::Expense;
use std::sync::Arc;
use tracing::info;

use super::error::DomainResult;
use super::ids::generate_id;
use super::validation::validate_expense;
use crate::storage::{RecordStore, Repository};

#[derive(Clone)]
pub struct ExpenseService {
    expenses: Repository<Expense>,
}

impl ExpenseService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            expenses: Repository::new(store),
        }
    }

    pub async fn list_expenses(&self) -> DomainResult<Vec<Expense>> {
        info!("Listing all expenses");
        let expenses = self.expenses.all().await?;
        info!("Found {} expenses", expenses.len());
        Ok(expenses)
    }

    pub async fn create_expense(&self, mut expense: Expense) -> DomainResult<Expense> {
        info!("Creating expense: {} of {}", expense.expense_type, expense.amount);

        if expense.date.trim().is_empty() {
            expense.date = Local::now().format("%Y-%m-%d").to_string();
        }
        normalize(&mut expense);
        validate_expense(&expense)?;
        if expense.id.trim().is_empty() {
            expense.id = generate_id();
        }

        self.expenses.add(&expense).await?;

        info!("Created expense with ID: {}", expense.id);
        Ok(expense)
    }

    pub async fn update_expense(&self, expense_id: &str, mut expense: Expense) -> DomainResult<Expense> {
        info!("Updating expense: {}", expense_id);

        self.expenses.require(expense_id).await?;
        expense.id = expense_id.to_string();
        normalize(&mut expense);
        validate_expense(&expense)?;

        self.expenses.upsert(&expense).await?;
        Ok(expense)
    }

    pub async fn delete_expense(&self, expense_id: &str) -> DomainResult<()> {
        info!("Deleting expense: {}", expense_id);
        self.expenses.delete(expense_id).await?;
        Ok(())
    }
}

fn normalize(expense: &mut Expense) {
    expense.expense_type = expense.expense_type.trim().to_string();
    expense.notes = expense
        .notes
        .take()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
}
