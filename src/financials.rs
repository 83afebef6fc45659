//! Income/expense summary over transactions

use crate::domain::{Transaction, TransactionKind};

const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialSummary {
    pub income: f64,
    pub expenses: f64,
    /// Expenses per category, largest first
    pub expenses_by_category: Vec<(String, f64)>,
}

impl FinancialSummary {
    pub fn balance(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Totals for all transactions, or one project's
pub fn summarize(transactions: &[Transaction], project_id: Option<&str>) -> FinancialSummary {
    let mut summary = FinancialSummary::default();

    let relevant = transactions
        .iter()
        .filter(|t| project_id.map_or(true, |id| t.project_id.as_deref() == Some(id)));
    for transaction in relevant {
        let amount = transaction.amount.abs();
        match &transaction.kind {
            TransactionKind::Income => summary.income += amount,
            TransactionKind::Expense => {
                summary.expenses += amount;
                let category = transaction.category.as_deref().unwrap_or(UNCATEGORIZED);
                match summary.expenses_by_category.iter_mut().find(|(name, _)| name == category) {
                    Some((_, total)) => *total += amount,
                    None => summary.expenses_by_category.push((category.to_string(), amount)),
                }
            }
            TransactionKind::Other(kind) => {
                log::debug!("[FINANCIALS] Skipping transaction {} of kind {}", transaction.id, kind);
            }
        }
    }

    summary
        .expenses_by_category
        .sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction(id: &str, kind: TransactionKind, amount: f64, category: Option<&str>) -> Transaction {
        Transaction {
            id: id.into(),
            project_id: Some("p1".into()),
            description: String::new(),
            amount,
            kind,
            category: category.map(str::to_string),
            occurred_at: None,
            created_at: None,
        }
    }

    #[test]
    fn test_totals_and_categories() {
        let transactions = vec![
            transaction("1", TransactionKind::Income, 1500.0, Some("Client")),
            transaction("2", TransactionKind::Expense, 250.5, Some("Hosting")),
            transaction("3", TransactionKind::Expense, 49.5, None),
            transaction("4", TransactionKind::Expense, 100.0, Some("Hosting")),
            transaction("5", TransactionKind::parse("refund"), 999.0, None),
        ];

        let summary = summarize(&transactions, None);
        assert_eq!(summary.income, 1500.0);
        assert_eq!(summary.expenses, 400.0);
        assert_eq!(summary.balance(), 1100.0);
        assert_eq!(
            summary.expenses_by_category,
            vec![("Hosting".to_string(), 350.5), ("Uncategorized".to_string(), 49.5)]
        );
    }

    #[test]
    fn test_project_filter() {
        let mut other = transaction("1", TransactionKind::Income, 10.0, None);
        other.project_id = Some("p2".into());
        let transactions = vec![other, transaction("2", TransactionKind::Income, 5.0, None)];

        assert_eq!(summarize(&transactions, Some("p1")).income, 5.0);
        assert_eq!(summarize(&[], None), FinancialSummary::default());
    }
}
