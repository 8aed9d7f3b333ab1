use campuslife_core::db::open_db_in_memory;
use campuslife_core::{BudgetCategory, BudgetService, BudgetServiceError, SqliteKvStore, User};
use uuid::Uuid;

#[test]
fn expenses_land_in_their_category() {
    let conn = open_db_in_memory().unwrap();
    let service = BudgetService::new(SqliteKvStore::new(&conn));

    service
        .add_expense(User::Maria, BudgetCategory::Food, 12.5, " lunch ")
        .unwrap();
    service
        .add_expense(User::Maria, BudgetCategory::Money, 40.0, "books")
        .unwrap();

    let budget = service.load_budget(User::Maria).unwrap();
    assert_eq!(budget.food.len(), 1);
    assert_eq!(budget.food[0].description, "lunch");
    assert_eq!(budget.money.len(), 1);
    assert!(service.load_budget(User::Reni).unwrap().food.is_empty());
}

#[test]
fn invalid_amounts_and_descriptions_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = BudgetService::new(SqliteKvStore::new(&conn));

    for amount in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            service.add_expense(User::Luna, BudgetCategory::Food, amount, "snack"),
            Err(BudgetServiceError::InvalidAmount(_))
        ));
    }
    assert!(matches!(
        service.add_expense(User::Luna, BudgetCategory::Food, 2.0, "  "),
        Err(BudgetServiceError::BlankDescription)
    ));
    assert!(matches!(
        service.set_limit(User::Luna, BudgetCategory::Food, -1.0),
        Err(BudgetServiceError::InvalidLimit(_))
    ));
}

#[test]
fn summary_and_overview_follow_limits() {
    let conn = open_db_in_memory().unwrap();
    let service = BudgetService::new(SqliteKvStore::new(&conn));

    assert_eq!(service.overview(User::Sheila).unwrap().percentage, 0);

    service
        .set_limit(User::Sheila, BudgetCategory::Food, 100.0)
        .unwrap();
    service
        .set_limit(User::Sheila, BudgetCategory::Money, 200.0)
        .unwrap();
    service
        .add_expense(User::Sheila, BudgetCategory::Food, 130.0, "groceries")
        .unwrap();
    service
        .add_expense(User::Sheila, BudgetCategory::Money, 20.0, "bus pass")
        .unwrap();

    let food = service
        .category_summary(User::Sheila, BudgetCategory::Food)
        .unwrap();
    assert_eq!(food.spent, 130.0);
    assert_eq!(food.remaining, -30.0);

    let overview = service.overview(User::Sheila).unwrap();
    assert_eq!(overview.total_limit, 300.0);
    assert_eq!(overview.total_spent, 150.0);
    assert_eq!(overview.percentage, 50);
}

#[test]
fn delete_and_reset() {
    let conn = open_db_in_memory().unwrap();
    let service = BudgetService::new(SqliteKvStore::new(&conn));
    let expense = service
        .add_expense(User::Reni, BudgetCategory::Money, 5.0, "coffee")
        .unwrap();

    assert!(matches!(
        service.delete_expense(User::Reni, BudgetCategory::Food, expense.id),
        Err(BudgetServiceError::ExpenseNotFound(_))
    ));
    service
        .delete_expense(User::Reni, BudgetCategory::Money, expense.id)
        .unwrap();
    assert!(matches!(
        service.delete_expense(User::Reni, BudgetCategory::Money, Uuid::new_v4()),
        Err(BudgetServiceError::ExpenseNotFound(_))
    ));

    service
        .set_limit(User::Reni, BudgetCategory::Food, 50.0)
        .unwrap();
    service.reset_budget(User::Reni).unwrap();
    assert_eq!(
        service
            .category_summary(User::Reni, BudgetCategory::Food)
            .unwrap()
            .limit,
        0.0
    );
}
