// Text-entry forms for the login and signup screens.

use squad_app::api::model::SignupRequest;
use squad_app::session::UserType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Rendered masked.
    Secret,
    /// Cycled with Left/Right instead of typed.
    Choice(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    /// Index into the options of a `Choice` field.
    pub choice: usize,
}

impl Field {
    fn new(label: &'static str, kind: FieldKind) -> Self {
        Field {
            label,
            kind,
            value: String::new(),
            choice: 0,
        }
    }

    /// The value as entered, or the chosen option.
    pub fn current(&self) -> &str {
        match &self.kind {
            FieldKind::Choice(options) => options.get(self.choice).map_or("", String::as_str),
            FieldKind::Text | FieldKind::Secret => &self.value,
        }
    }

    /// What the screen shows: secrets are masked.
    pub fn display(&self) -> String {
        match self.kind {
            FieldKind::Secret => "*".repeat(self.value.chars().count()),
            _ => self.current().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

const ROLES: [&str; 2] = ["Student", "Teacher"];

impl Form {
    pub fn login() -> Self {
        Form {
            fields: vec![
                Field::new("Email", FieldKind::Text),
                Field::new("Password", FieldKind::Secret),
            ],
            focus: 0,
        }
    }

    pub fn signup(houses: &[String]) -> Self {
        Form {
            fields: vec![
                Field::new("Name", FieldKind::Text),
                Field::new("Email", FieldKind::Text),
                Field::new("Password", FieldKind::Secret),
                Field::new(
                    "Role",
                    FieldKind::Choice(ROLES.iter().map(|r| r.to_string()).collect()),
                ),
                Field::new("House", FieldKind::Choice(houses.to_vec())),
            ],
            focus: 0,
        }
    }

    pub fn get(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map_or("", Field::current)
    }

    /// Replace the options of a choice field, keeping the selection when it
    /// is still in range.
    pub fn set_choices(&mut self, label: &str, options: &[String]) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.label == label) {
            if field.kind != FieldKind::Choice(options.to_vec()) {
                field.kind = FieldKind::Choice(options.to_vec());
                if field.choice >= options.len() {
                    field.choice = 0;
                }
            }
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn push(&mut self, c: char) {
        let field = &mut self.fields[self.focus];
        if field.kind != FieldKind::Text && field.kind != FieldKind::Secret {
            return;
        }
        field.value.push(c);
    }

    pub fn backspace(&mut self) {
        self.fields[self.focus].value.pop();
    }

    /// Step a choice field forwards or backwards.
    pub fn cycle(&mut self, forward: bool) {
        let field = &mut self.fields[self.focus];
        let FieldKind::Choice(options) = &field.kind else {
            return;
        };
        let n = options.len();
        if n == 0 {
            return;
        }
        field.choice = if forward {
            (field.choice + 1) % n
        } else {
            (field.choice + n - 1) % n
        };
    }

    pub fn is_last_field(&self) -> bool {
        self.focus + 1 == self.fields.len()
    }

    pub fn login_pair(&self) -> (String, String) {
        (self.get("Email").trim().to_string(), self.get("Password").to_string())
    }

    pub fn signup_request(&self) -> SignupRequest {
        let user_type = if self.get("Role") == "Teacher" {
            UserType::Teacher
        } else {
            UserType::Student
        };
        let house = Some(self.get("House").to_string()).filter(|h| !h.is_empty());
        SignupRequest {
            name: self.get("Name").trim().to_string(),
            email: self.get("Email").trim().to_string(),
            password: self.get("Password").to_string(),
            house,
            user_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn houses() -> Vec<String> {
        vec!["Tata".into(), "Oberoi".into()]
    }

    #[test]
    fn typing_goes_to_focused_field() {
        let mut form = Form::login();
        for c in "a@b.in".chars() {
            form.push(c);
        }
        form.next_field();
        form.push('x');
        form.push('y');
        form.backspace();
        assert_eq!(form.login_pair(), ("a@b.in".to_string(), "x".to_string()));
    }

    #[test]
    fn secrets_are_masked() {
        let mut form = Form::login();
        form.next_field();
        for c in "hunter2".chars() {
            form.push(c);
        }
        assert_eq!(form.fields[1].display(), "*******");
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = Form::login();
        form.prev_field();
        assert_eq!(form.focus, 1);
        assert!(form.is_last_field());
        form.next_field();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn choice_fields_cycle_and_ignore_typing() {
        let mut form = Form::signup(&houses());
        form.focus = 4;
        form.push('z');
        assert_eq!(form.get("House"), "Tata");
        form.cycle(true);
        assert_eq!(form.get("House"), "Oberoi");
        form.cycle(true);
        assert_eq!(form.get("House"), "Tata");
        form.cycle(false);
        assert_eq!(form.get("House"), "Oberoi");
    }

    #[test]
    fn signup_request_reads_role_and_house() {
        let mut form = Form::signup(&houses());
        form.fields[0].value = " Asha ".into();
        form.fields[1].value = "asha@school.in".into();
        form.fields[2].value = "pw".into();
        form.focus = 3;
        form.cycle(true);

        let req = form.signup_request();
        assert_eq!(req.name, "Asha");
        assert_eq!(req.user_type, UserType::Teacher);
        assert_eq!(req.house.as_deref(), Some("Tata"));
    }

    #[test]
    fn set_choices_fills_an_empty_house_list() {
        let mut form = Form::signup(&[]);
        assert_eq!(form.get("House"), "");
        form.set_choices("House", &houses());
        assert_eq!(form.get("House"), "Tata");
    }
}
