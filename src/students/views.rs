//! Server-rendered pages. Kept deliberately thin: small builders around a
//! shared layout, with every user-supplied value escaped.

use time::format_description::well_known::Rfc3339;

use crate::students::forms::{Course, FieldError, ProfileForm, RegisterForm, UpdateForm};
use crate::students::repo::Student;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n\
         <nav><a href=\"/\">Home</a> | <a href=\"/student/\">Profile</a> | \
         <a href=\"/student/add\">Register</a> | <a href=\"/student/list\">Students</a></nav>\n\
         {}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

fn messages_block(messages: &[String]) -> String {
    messages
        .iter()
        .map(|m| format!("<p class=\"flash\">{}</p>\n", escape(m)))
        .collect()
}

fn errors_block(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}: {}</li>", escape(e.field), escape(&e.message)))
        .collect();
    format!("<ul class=\"errors\">{}</ul>\n", items)
}

fn course_options(selected: &str) -> String {
    let mut out = String::from("<option value=\"\">Select a course</option>");
    for course in Course::ALL {
        let marker = if course.as_str().eq_ignore_ascii_case(selected.trim()) {
            " selected"
        } else {
            ""
        };
        out.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>",
            course.as_str(),
            marker
        ));
    }
    out
}

fn students_table(students: &[Student]) -> String {
    if students.is_empty() {
        return "<p>No students registered yet.</p>\n".into();
    }
    let rows: String = students
        .iter()
        .map(|s| {
            let created = s
                .created_at
                .format(&Rfc3339)
                .unwrap_or_else(|_| String::new());
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td><a href=\"/update/{}\">Update</a> <a href=\"/delete/{}\">Delete</a></td></tr>\n",
                s.id,
                escape(&s.name),
                escape(&s.email),
                escape(&s.address),
                escape(&s.course),
                escape(&created),
                s.id,
                s.id
            )
        })
        .collect();
    format!(
        "<table>\n<tr><th>Id</th><th>Name</th><th>Email</th><th>Address</th>\
         <th>Course</th><th>Registered</th><th></th></tr>\n{}</table>\n",
        rows
    )
}

pub fn index_page() -> String {
    layout(
        "Student Registry",
        "<h1>Student Registry</h1>\n<p>Register students for programming courses.</p>",
    )
}

pub fn profile_page(form: &ProfileForm, greeting: Option<&str>, errors: &[FieldError]) -> String {
    let greeting_html = match greeting {
        Some(name) => format!(
            "<p class=\"flash\">Welcome to {}&#39;s profile</p>\n",
            escape(name)
        ),
        None => String::new(),
    };
    let body = format!(
        "<h1>Student Profile</h1>\n{}{}\
         <form method=\"post\" action=\"/student/\">\n\
         <label>Enter Student Name: <input name=\"student_name\" value=\"{}\"></label>\n\
         <button type=\"submit\">Show Student</button>\n</form>",
        greeting_html,
        errors_block(errors),
        escape(&form.student_name)
    );
    layout("Student Profile", &body)
}

pub fn register_page(
    form: &RegisterForm,
    errors: &[FieldError],
    messages: &[String],
    students: &[Student],
) -> String {
    let body = format!(
        "<h1>Register Student</h1>\n{}{}\
         <form method=\"post\" action=\"/student/add\">\n\
         <label>Student Name: <input name=\"name\" placeholder=\"Name\" value=\"{}\"></label><br>\n\
         <label>Student Email: <input name=\"email\" placeholder=\"Email\" value=\"{}\"></label><br>\n\
         <label>Student Address: <input name=\"address\" placeholder=\"Address\" value=\"{}\"></label><br>\n\
         <label>Student Course: <select name=\"course\">{}</select></label><br>\n\
         <label>Student Password: <input type=\"password\" name=\"password\" placeholder=\"Password\"></label><br>\n\
         <label>Confirm Password: <input type=\"password\" name=\"confirm_password\" placeholder=\"Confirm password\"></label><br>\n\
         <button type=\"submit\">Register</button>\n</form>\n<h2>Our Students</h2>\n{}",
        messages_block(messages),
        errors_block(errors),
        escape(&form.name),
        escape(&form.email),
        escape(&form.address),
        course_options(&form.course),
        students_table(students)
    );
    layout("Register Student", &body)
}

pub fn update_page(
    id: i64,
    form: &UpdateForm,
    errors: &[FieldError],
    messages: &[String],
) -> String {
    let body = format!(
        "<h1>Update Student</h1>\n{}{}\
         <form method=\"post\" action=\"/update/{}\">\n\
         <label>Student Name: <input name=\"name\" value=\"{}\"></label><br>\n\
         <label>Student Email: <input name=\"email\" value=\"{}\"></label><br>\n\
         <label>Student Address: <input name=\"address\" value=\"{}\"></label><br>\n\
         <label>Student Course: <select name=\"course\">{}</select></label><br>\n\
         <button type=\"submit\">Update</button>\n</form>",
        messages_block(messages),
        errors_block(errors),
        id,
        escape(&form.name),
        escape(&form.email),
        escape(&form.address),
        course_options(&form.course)
    );
    layout("Update Student", &body)
}

pub fn delete_page(student: &Student, messages: &[String]) -> String {
    let body = format!(
        "<h1>Delete Student</h1>\n{}\
         <p>Remove <strong>{}</strong> ({}) from the table?</p>\n\
         <form method=\"post\" action=\"/delete/{}\">\n\
         <input type=\"hidden\" name=\"confirm\" value=\"yes\">\n\
         <button type=\"submit\">Delete Student</button>\n</form>\n\
         <p><a href=\"/student/list\">Cancel</a></p>",
        messages_block(messages),
        escape(&student.name),
        escape(&student.email),
        student.id
    );
    layout("Delete Student", &body)
}

pub fn list_page(students: &[Student]) -> String {
    let body = format!("<h1>Our Students</h1>\n{}", students_table(students));
    layout("Student List", &body)
}

pub fn not_found_page() -> String {
    layout(
        "Page Not Found",
        "<h1>404</h1>\n<p>That page does not exist.</p>",
    )
}

pub fn server_error_page() -> String {
    layout(
        "Server Error",
        "<h1>500</h1>\n<p>Something went wrong on our side. Try again.</p>",
    )
}
