//! Embedded Python fragment templates and the rendering entry point.
//!
//! Rendering is cosmetic substitution only — structural decisions (where a
//! fragment lands, whether it is inserted at all) belong to the planner.

use minijinja::Environment;
use serde::Serialize;

use crate::types::GenError;
use crate::views::ViewKind;

/// Render one template source against a serializable context.
pub fn render(source: &str, ctx: impl Serialize) -> Result<String, GenError> {
    let mut env = Environment::new();
    // Fragments are spliced into files; their final newline is significant.
    env.set_keep_trailing_newline(true);
    Ok(env.render_str(source, ctx)?)
}

/// Header seeded into a views file that does not exist yet. Carries one
/// import line so later import merges have an anchor.
pub const VIEWS_HEADER: &str = r#"# -*- coding: utf-8 -*-
from __future__ import unicode_literals

from apps.{{ app_name }}.models{{ model_module }} import {{ model_name }}
"#;

const VIEW_LIST: &str = r#"

class {{ model_name }}ListView(ListView):
    model = {{ model_name }}
    paginate_by = {{ paginate_by }}
"#;

const VIEW_DETAIL: &str = r#"

class {{ model_name }}DetailView(DetailView):
    model = {{ model_name }}
    slug_field = '{{ slug_field }}'
"#;

const VIEW_CREATE: &str = r#"

class {{ model_name }}CreateView(CreateView):
    model = {{ model_name }}
    form_class = {{ model_name }}Form
"#;

const VIEW_UPDATE: &str = r#"

class {{ model_name }}UpdateView(UpdateView):
    model = {{ model_name }}
    form_class = {{ model_name }}Form
"#;

const VIEW_DELETE: &str = r#"

class {{ model_name }}DeleteView(DeleteView):
    model = {{ model_name }}
    success_url = {{ success_url }}
"#;

/// The view-class fragment for one kind.
pub fn view_class_template(kind: ViewKind) -> &'static str {
    match kind {
        ViewKind::List => VIEW_LIST,
        ViewKind::Detail => VIEW_DETAIL,
        ViewKind::Create => VIEW_CREATE,
        ViewKind::Update => VIEW_UPDATE,
        ViewKind::Delete => VIEW_DELETE,
    }
}

/// Whole-file template for the admin module registering a generated model.
pub const ADMIN_MODULE: &str = r#"# -*- coding: utf-8 -*-
from django.contrib import admin

from {{ model_python_path }} import {{ model_name }}


class {{ model_name }}Admin(admin.ModelAdmin):
    pass


admin.site.register({{ model_name }}, {{ model_name }}Admin)
"#;

/// Whole-file template for the generated model form.
pub const FORM_MODULE: &str = r#"# -*- coding: utf-8 -*-
from __future__ import unicode_literals

from django import forms

from {{ model_python_path }} import {{ model_name }}


class {{ model_name }}Form(forms.ModelForm):

    class Meta:
        model = {{ model_name }}
        fields = '__all__'
"#;

/// Header of a freshly created model module; [`MODEL_CLASS`] appends below it.
pub const MODEL_HEADER: &str = "# -*- coding: utf-8 -*-
from __future__ import unicode_literals

from django.db import models
";

/// Model-class fragment. `declarations` arrives pre-indented, one field per
/// line. Leading blank lines separate it from whatever it is appended to.
pub const MODEL_CLASS: &str = r#"

class {{ model_name }}(models.Model):
{{ declarations }}
{%- if str_field %}

    def __str__(self):
        return self.{{ str_field }}
{%- endif %}
{%- if def_save %}

    def save(self, *args, **kwargs):
        super({{ model_name }}, self).save(*args, **kwargs)
{%- endif %}
"#;
