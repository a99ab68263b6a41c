//! How much a user spent in each category, for comparing against their budgets.

use std::collections::BTreeMap;

use rusqlite::{Connection, named_params};

use crate::{Error, amount::Amount, auth::UserID, category::CategoryName, month::YearMonth};

/// The total spent per category, keyed and sorted by category name.
pub type Spending = BTreeMap<CategoryName, Amount>;

/// Sum the expenses of `user_id` dated in `month`, grouped by category.
///
/// Income is ignored, and categories without any expenses in the month are absent.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_spending_by_category(
    user_id: UserID,
    month: YearMonth,
    connection: &Connection,
) -> Result<Spending, Error> {
    connection
        .prepare(
            "SELECT category, SUM(amount) FROM \"transaction\"
             WHERE user_id = :user_id
               AND type = 'expense'
               AND strftime('%Y-%m', date) = :month
             GROUP BY category",
        )?
        .query_map(
            named_params! {":user_id": user_id, ":month": month},
            |row| Ok((row.get::<_, CategoryName>(0)?, row.get::<_, Amount>(1)?)),
        )?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        amount::Amount,
        budget::{create_or_update_budget, get_budgets, get_spending_by_category},
        category::CategoryName,
        month::YearMonth,
        transaction::{
            TransactionType,
            test_helpers::{create_test_user, get_test_connection, insert_transaction},
        },
    };

    fn may() -> YearMonth {
        "2024-05".parse().unwrap()
    }

    #[test]
    fn spending_is_empty_without_expenses() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice", &conn);
        insert_transaction(
            user_id,
            TransactionType::Income,
            "Salary",
            1000_00,
            date!(2024 - 05 - 01),
            &conn,
        );

        let spending = get_spending_by_category(user_id, may(), &conn).unwrap();

        assert!(spending.is_empty());
    }

    #[test]
    fn spending_sums_expenses_per_category_in_month() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice", &conn);
        for (category, cents, date) in [
            ("Food", 120_00, date!(2024 - 05 - 02)),
            ("Food", 80_50, date!(2024 - 05 - 20)),
            ("Transport", 45_00, date!(2024 - 05 - 31)),
            ("Food", 999_00, date!(2024 - 06 - 01)),
        ] {
            insert_transaction(
                user_id,
                TransactionType::Expense,
                category,
                cents,
                date,
                &conn,
            );
        }

        let spending = get_spending_by_category(user_id, may(), &conn).unwrap();

        assert_eq!(
            spending.into_iter().collect::<Vec<_>>(),
            vec![
                (CategoryName::new_unchecked("Food"), Amount::from_cents(200_50)),
                (
                    CategoryName::new_unchecked("Transport"),
                    Amount::from_cents(45_00)
                ),
            ]
        );
    }

    #[test]
    fn spending_ignores_other_users() {
        let conn = get_test_connection();
        let alice = create_test_user("alice", &conn);
        let bob = create_test_user("bob", &conn);
        insert_transaction(
            bob,
            TransactionType::Expense,
            "Food",
            100,
            date!(2024 - 05 - 01),
            &conn,
        );

        assert!(
            get_spending_by_category(alice, may(), &conn)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn budget_and_spending_for_same_category() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice", &conn);
        insert_transaction(
            user_id,
            TransactionType::Expense,
            "Food",
            500_00,
            date!(2024 - 05 - 10),
            &conn,
        );
        create_or_update_budget(
            user_id,
            CategoryName::new_unchecked("Food"),
            Amount::from_cents(2000_00),
            may(),
            &conn,
        )
        .unwrap();

        let spending = get_spending_by_category(user_id, may(), &conn).unwrap();
        let budgets = get_budgets(user_id, may(), &conn).unwrap();

        assert_eq!(
            serde_json::to_value(&spending).unwrap(),
            serde_json::json!({"Food": 500.0})
        );
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, Amount::from_cents(2000_00));
    }
}
