//! Per-view-kind behavior table.
//!
//! Each generic view kind is a tagged variant; everything that varies by kind
//! (class names, URL entries, template suffixes, fragment contexts) is
//! selected by `match` here rather than scattered through the orchestrator.

use serde::Serialize;

use crate::types::GenContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    List,
    Detail,
    Create,
    Update,
    Delete,
}

impl ViewKind {
    /// Canonical generation order.
    pub const ALL: [ViewKind; 5] = [
        ViewKind::List,
        ViewKind::Detail,
        ViewKind::Create,
        ViewKind::Update,
        ViewKind::Delete,
    ];

    /// The Django generic base class.
    pub fn generic_class(self) -> &'static str {
        match self {
            ViewKind::List => "ListView",
            ViewKind::Detail => "DetailView",
            ViewKind::Create => "CreateView",
            ViewKind::Update => "UpdateView",
            ViewKind::Delete => "DeleteView",
        }
    }

    /// The generated class name: `EntryListView`.
    pub fn user_class(self, model_name: &str) -> String {
        format!("{}{}", model_name, self.generic_class())
    }

    pub fn route_suffix(self) -> &'static str {
        match self {
            ViewKind::List => "list",
            ViewKind::Detail => "detail",
            ViewKind::Create => "create",
            ViewKind::Update => "update",
            ViewKind::Delete => "delete",
        }
    }

    /// The route name used for the idempotency check: `entry.detail`.
    pub fn route_name(self, ctx: &GenContext) -> String {
        format!("{}.{}", ctx.lower_model(), self.route_suffix())
    }

    /// One `url(...)` entry for the route aggregate.
    pub fn url_entry(self, ctx: &GenContext) -> String {
        let lower = ctx.lower_model();
        let class = self.user_class(&ctx.model_name);
        let name = self.route_name(ctx);
        match self {
            ViewKind::List => {
                format!("url(r'^{lower}/$', {class}.as_view(), name='{name}')")
            }
            ViewKind::Detail => {
                let capture = if ctx.is_slug {
                    "(?P<slug>[-a-zA-Z0-9_]+)"
                } else {
                    r"(?P<pk>\d+)"
                };
                format!("url(r'^{lower}/{capture}/$', {class}.as_view(), name='{name}')")
            }
            ViewKind::Create => {
                format!("url(r'^{lower}/create/$', {class}.as_view(), name='{name}')")
            }
            ViewKind::Update => {
                format!(
                    "url(r'^{lower}/update/(?P<pk>\\d+)/$', {class}.as_view(), name='{name}')"
                )
            }
            ViewKind::Delete => {
                format!(
                    "url(r'^{lower}/delete/(?P<pk>\\d+)/$', {class}.as_view(), name='{name}')"
                )
            }
        }
    }

    /// Whether the kind needs the generated model form.
    pub fn needs_form(self) -> bool {
        matches!(self, ViewKind::Create | ViewKind::Update)
    }

    /// File-name suffix of the HTML template this kind renders, when any.
    /// Create and update share the `_form` template; delete renders none.
    pub fn template_suffix(self) -> Option<&'static str> {
        match self {
            ViewKind::List => Some("_list"),
            ViewKind::Detail => Some("_detail"),
            ViewKind::Create | ViewKind::Update => Some("_form"),
            ViewKind::Delete => None,
        }
    }

    /// Context fed to the view-class fragment template.
    pub fn view_context(self, ctx: &GenContext) -> ViewContext {
        ViewContext {
            model_name: ctx.model_name.clone(),
            paginate_by: ctx.paginate_by,
            slug_field: ctx.slug_field.clone(),
            success_url: ctx.delete_success_url.clone(),
        }
    }

    /// Body of the HTML template for this kind, built from the model fields.
    pub fn template_body(self, ctx: &GenContext) -> Option<String> {
        let lower = ctx.lower_model();
        match self {
            ViewKind::List => {
                let rows = field_lines(&ctx.model_fields, |f| {
                    format!("        <li>{{{{ item.{f} }}}}</li>")
                });
                Some(format!(
                    "{{% extends \"base.html\" %}}\n\n{{% block content %}}\n<ul class=\"{lower}-list\">\n    {{% for item in object_list %}}\n{rows}\n    {{% endfor %}}\n</ul>\n{{% endblock %}}\n"
                ))
            }
            ViewKind::Detail => {
                let rows = field_lines(&ctx.model_fields, |f| {
                    format!("    <p>{{{{ object.{f} }}}}</p>")
                });
                Some(format!(
                    "{{% extends \"base.html\" %}}\n\n{{% block content %}}\n<div class=\"{lower}-detail\">\n{rows}\n</div>\n{{% endblock %}}\n"
                ))
            }
            ViewKind::Create | ViewKind::Update => {
                let rows = field_lines(&ctx.model_fields, |f| {
                    format!(
                        "        <div class=\"form-create__field\">\n            {{{{ form.{f}.errors }}}}\n            {{{{ form.{f}.label_tag }}}}\n            {{{{ form.{f} }}}}\n        </div>"
                    )
                });
                Some(format!(
                    "{{% extends \"base.html\" %}}\n\n{{% block content %}}\n<form action=\"\" method=\"post\" class=\"form-create\">\n    {{% csrf_token %}}\n{rows}\n    <button type=\"submit\">Save</button>\n</form>\n{{% endblock %}}\n"
                ))
            }
            ViewKind::Delete => None,
        }
    }
}

/// Serializable context for the view-class fragment templates.
#[derive(Debug, Clone, Serialize)]
pub struct ViewContext {
    pub model_name: String,
    pub paginate_by: u32,
    pub slug_field: String,
    pub success_url: String,
}

fn field_lines(fields: &[String], line: impl Fn(&str) -> String) -> String {
    fields
        .iter()
        .map(|f| line(f))
        .collect::<Vec<_>>()
        .join("\n")
}
