use jobly_core::db::open_db_in_memory;
use jobly_core::{
    Caller, CompanyService, CompanyUpdate, ErrorKind, FilterRequest, JobService, JobUpdate,
    NewCompany, NewJob, NewUser, Patch, ServiceError, SqliteCompanyRepository, SqliteJobRepository,
    SqliteUserRepository, UserService, UserUpdate,
};

fn admin() -> Caller {
    Caller::from_claims("root", true)
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password_hash: "hash".to_string(),
        first_name: "F".to_string(),
        last_name: "L".to_string(),
        email: format!("{username}@example.com"),
        is_admin: false,
    }
}

#[test]
fn company_writes_require_admin_and_leave_store_untouched() {
    let conn = open_db_in_memory().unwrap();
    let service = CompanyService::new(SqliteCompanyRepository::new(&conn));
    let user = Caller::from_claims("u1", false);

    let err = service
        .create(&user, &NewCompany::new("c1", "C1", "Desc"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Denied(_)));
    assert!(service.find_all(&Caller::Anonymous, None).unwrap().is_empty());

    service
        .create(&admin(), &NewCompany::new("c1", "C1", "Desc"))
        .unwrap();
    let rename = CompanyUpdate {
        name: Patch::Value("Renamed".to_string()),
        ..CompanyUpdate::default()
    };
    assert_eq!(
        service.update(&user, "c1", &rename).unwrap_err().kind(),
        ErrorKind::AuthorizationDenied
    );
    assert_eq!(
        service.remove(&Caller::Anonymous, "c1").unwrap_err().kind(),
        ErrorKind::AuthorizationDenied
    );
    assert_eq!(service.get(&Caller::Anonymous, "c1").unwrap().company.name, "C1");
}

#[test]
fn denial_is_reported_before_not_found() {
    let conn = open_db_in_memory().unwrap();
    let jobs = JobService::new(SqliteJobRepository::new(&conn));

    let update = JobUpdate {
        title: Patch::Value("X".to_string()),
        ..JobUpdate::default()
    };
    assert_eq!(
        jobs.update(&Caller::Anonymous, 404, &update).unwrap_err().kind(),
        ErrorKind::AuthorizationDenied
    );
    assert_eq!(
        jobs.update(&admin(), 404, &update).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn public_job_listing_honors_filters() {
    let conn = open_db_in_memory().unwrap();
    CompanyService::new(SqliteCompanyRepository::new(&conn))
        .create(&admin(), &NewCompany::new("c1", "C1", "Desc"))
        .unwrap();
    let jobs = JobService::new(SqliteJobRepository::new(&conn));
    for (title, salary) in [("Low", 10), ("High", 1_000)] {
        let mut job = NewJob::new(title, "c1");
        job.salary = Some(salary);
        jobs.create(&admin(), &job).unwrap();
    }

    let filters = FilterRequest::new().with("minSalary", "500");
    let listed = jobs.find_all(&Caller::Anonymous, Some(&filters)).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "High");

    let bad = FilterRequest::new().with("minSalary", "x");
    assert_eq!(
        jobs.find_all(&Caller::Anonymous, Some(&bad)).unwrap_err().kind(),
        ErrorKind::BadRequest
    );
}

#[test]
fn users_manage_only_themselves() {
    let conn = open_db_in_memory().unwrap();
    CompanyService::new(SqliteCompanyRepository::new(&conn))
        .create(&admin(), &NewCompany::new("c1", "C1", "Desc"))
        .unwrap();
    let job = JobService::new(SqliteJobRepository::new(&conn))
        .create(&admin(), &NewJob::new("J1", "c1"))
        .unwrap();

    let users = UserService::new(SqliteUserRepository::new(&conn));
    assert_eq!(
        users
            .create(&Caller::Anonymous, &new_user("u1"))
            .unwrap_err()
            .kind(),
        ErrorKind::AuthorizationDenied
    );
    users.create(&admin(), &new_user("u1")).unwrap();
    users.create(&admin(), &new_user("u2")).unwrap();

    let u1 = Caller::from_claims("u1", false);
    assert_eq!(users.apply(&u1, "u1", job.id).unwrap(), job.id);
    assert_eq!(users.get(&u1, "u1").unwrap().jobs, vec![job.clone()]);

    let update = UserUpdate {
        first_name: Patch::Value("Mallory".to_string()),
        ..UserUpdate::default()
    };
    assert_eq!(
        users.update(&u1, "u2", &update).unwrap_err().kind(),
        ErrorKind::AuthorizationDenied
    );
    assert_eq!(users.get(&admin(), "u2").unwrap().user.first_name, "F");

    assert_eq!(
        users.find_all(&u1).unwrap_err().kind(),
        ErrorKind::AuthorizationDenied
    );
    assert_eq!(users.find_all(&admin()).unwrap().len(), 2);

    users.remove(&u1, "u1").unwrap();
    assert_eq!(
        users.get(&admin(), "u1").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
