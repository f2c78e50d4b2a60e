use std::path::PathBuf;

use djgen_core::{
    run_view_generation, GenRun, Outcome, ProjectFiles, ProjectShape, TypeEntry, TypeRegistry,
    ViewKind, ViewOptions,
};

// ---------------------------------------------------------------------------
// Helpers: fixture project + re-run plumbing
// ---------------------------------------------------------------------------

const MODELS_PY: &str = "\
# -*- coding: utf-8 -*-
from django.db import models


class Entry(models.Model):
    title = models.CharField(max_length=255)
    body = models.TextField()

    def __str__(self):
        return self.title
";

const URLS_PY: &str = "\
# -*- coding: utf-8 -*-
from django.conf.urls import url

urlpatterns = [
]
";

fn shape() -> ProjectShape {
    ProjectShape {
        apps_root: "server/apps".into(),
        templates_root: "server/templates".into(),
        models_is_package: false,
        views_is_package: false,
    }
}

fn fixture() -> ProjectFiles {
    let mut files = ProjectFiles::new();
    files.insert("server/apps/blog/models.py", MODELS_PY);
    files.insert("server/apps/blog/urls.py", URLS_PY);
    files
}

fn options(kinds: Vec<ViewKind>) -> ViewOptions {
    ViewOptions {
        app: "blog".into(),
        model: "Entry".into(),
        kinds,
        paginate_by: 5,
        slug_field: "slug".into(),
        delete_success_url: "'/'".into(),
        model_file: None,
        view_file: None,
    }
}

fn apply_writes(files: &ProjectFiles, run: &GenRun) -> ProjectFiles {
    let mut next = files.clone();
    for (path, content) in &run.writes {
        next.insert(path.clone(), content.clone());
    }
    next
}

fn written<'a>(run: &'a GenRun, path: &str) -> &'a str {
    run.writes
        .iter()
        .find(|(p, _)| p == &PathBuf::from(path))
        .map(|(_, c)| c.as_str())
        .unwrap_or_else(|| panic!("expected a write for {path}"))
}

// ---------------------------------------------------------------------------
// Full generation run
// ---------------------------------------------------------------------------

#[test]
fn full_run_inserts_everything() {
    let run = run_view_generation(&options(ViewKind::ALL.to_vec()), &shape(), &fixture()).unwrap();

    assert!(run.report.success);
    assert_eq!(run.report.count(Outcome::FailedAnchor), 0);
    assert_eq!(run.report.count(Outcome::SkippedDuplicate), 0);

    let views = written(&run, "server/apps/blog/views.py");
    for class in [
        "EntryListView",
        "EntryDetailView",
        "EntryCreateView",
        "EntryUpdateView",
        "EntryDeleteView",
    ] {
        assert!(views.contains(&format!("class {class}(")), "missing {class}");
    }
    assert!(views.contains("from apps.blog.models import Entry"));
    assert!(views.contains("from django.views.generic import ListView"));
    assert!(views.contains("from apps.blog.forms.entry import EntryForm"));

    let urls = written(&run, "server/apps/blog/urls.py");
    for name in [
        "entry.list",
        "entry.detail",
        "entry.create",
        "entry.update",
        "entry.delete",
    ] {
        assert!(urls.contains(&format!("name='{name}'")), "missing {name}");
    }
    assert!(urls.contains("from apps.blog.views import EntryListView"));

    let models = written(&run, "server/apps/blog/models.py");
    assert!(models.contains("def get_absolute_url(self):"));
    assert!(models.contains("from django.core.urlresolvers import reverse"));
    // Inserted after the preferred sibling, inside the class body.
    let str_pos = models.find("def __str__").unwrap();
    let url_pos = models.find("def get_absolute_url").unwrap();
    assert!(url_pos > str_pos);

    let form = written(&run, "server/apps/blog/forms/entry.py");
    assert!(form.contains("class EntryForm(forms.ModelForm):"));

    for template in ["entry_list.html", "entry_detail.html", "entry_form.html"] {
        let content = written(&run, &format!("server/templates/blog/{template}"));
        assert!(content.contains("{% block content %}"));
    }
}

#[test]
fn delete_success_url_prefers_list_route() {
    let run =
        run_view_generation(&options(vec![ViewKind::List, ViewKind::Delete]), &shape(), &fixture())
            .unwrap();
    let views = written(&run, "server/apps/blog/views.py");
    assert!(views.contains("success_url = reverse('blog:entry.list')"));
}

#[test]
fn delete_success_url_falls_back_without_list() {
    let run = run_view_generation(&options(vec![ViewKind::Delete]), &shape(), &fixture()).unwrap();
    let views = written(&run, "server/apps/blog/views.py");
    assert!(views.contains("success_url = '/'"));
}

#[test]
fn detail_route_uses_slug_when_model_has_one() {
    let mut files = fixture();
    files.insert(
        "server/apps/blog/models.py",
        "class Entry(models.Model):\n    slug = models.SlugField()\n",
    );
    let run = run_view_generation(&options(vec![ViewKind::Detail]), &shape(), &files).unwrap();
    let urls = written(&run, "server/apps/blog/urls.py");
    assert!(urls.contains("(?P<slug>"));
    let models = written(&run, "server/apps/blog/models.py");
    assert!(models.contains("args=(self.slug,)"));
}

// ---------------------------------------------------------------------------
// Idempotence: the second identical run changes nothing and reports failure
// ---------------------------------------------------------------------------

#[test]
fn second_run_is_a_noop_and_fails() {
    let first = run_view_generation(&options(ViewKind::ALL.to_vec()), &shape(), &fixture()).unwrap();
    assert!(first.report.success);

    let after_first = apply_writes(&fixture(), &first);
    let second = run_view_generation(&options(ViewKind::ALL.to_vec()), &shape(), &after_first)
        .unwrap();

    assert!(!second.report.success, "zero-insert run must report failure");
    assert!(second.writes.is_empty(), "second run must not change any file");
    for artifact in &second.report.artifacts {
        assert!(
            matches!(
                artifact.outcome,
                Outcome::SkippedDuplicate | Outcome::SkippedExisting
            ),
            "{} unexpectedly {:?}",
            artifact.identifier,
            artifact.outcome
        );
    }
}

#[test]
fn rerun_with_more_kinds_only_adds_the_new_ones() {
    let first = run_view_generation(&options(vec![ViewKind::List]), &shape(), &fixture()).unwrap();
    let after_first = apply_writes(&fixture(), &first);

    let second = run_view_generation(
        &options(vec![ViewKind::List, ViewKind::Detail]),
        &shape(),
        &after_first,
    )
    .unwrap();

    assert!(second.report.success);
    let outcomes: Vec<(String, Outcome)> = second
        .report
        .artifacts
        .iter()
        .map(|a| (a.identifier.clone(), a.outcome))
        .collect();
    assert!(outcomes.contains(&("EntryListView".into(), Outcome::SkippedDuplicate)));
    assert!(outcomes.contains(&("EntryDetailView".into(), Outcome::Inserted)));
    assert!(outcomes.contains(&("entry.detail".into(), Outcome::Inserted)));

    let views = written(&second, "server/apps/blog/views.py");
    assert_eq!(views.matches("class EntryListView").count(), 1);
}

// ---------------------------------------------------------------------------
// Anchor-miss safety
// ---------------------------------------------------------------------------

#[test]
fn missing_route_aggregate_fails_anchor_and_preserves_file() {
    let mut files = fixture();
    let bare_urls = "# -*- coding: utf-8 -*-\nfrom django.conf.urls import url\n";
    files.insert("server/apps/blog/urls.py", bare_urls);

    let run = run_view_generation(&options(vec![ViewKind::List]), &shape(), &files).unwrap();

    let route = run
        .report
        .artifacts
        .iter()
        .find(|a| a.identifier == "entry.list")
        .unwrap();
    assert_eq!(route.outcome, Outcome::FailedAnchor);
    // The urls file is byte-identical, so it must not be rewritten.
    assert!(!run
        .writes
        .iter()
        .any(|(p, _)| p == &PathBuf::from("server/apps/blog/urls.py")));
    // The rest of the run still lands.
    assert!(run.report.success);
}

// ---------------------------------------------------------------------------
// Declaration contract (end-to-end example)
// ---------------------------------------------------------------------------

#[test]
fn declaration_contract_example() {
    let mut registry = TypeRegistry::new();
    registry.insert("char", TypeEntry::new("CharField"));
    registry.insert("text", TypeEntry::new("TextField"));

    let opts = djgen_core::ModelOptions {
        app: "blog".into(),
        model: "Entry".into(),
        fields: vec!["title:char".into(), "body:text:blank,null".into()],
        def_save: false,
        model_file: None,
    };
    let run = djgen_core::generate_model(&opts, &shape(), &ProjectFiles::new(), &registry).unwrap();

    let module = written(&run, "server/apps/blog/models.py");
    let title_pos = module.find("title = CharField(verbose_name=\"Title\")").unwrap();
    let body_pos = module
        .find("body = TextField(\"blank\", \"null\", verbose_name=\"Body\")")
        .unwrap();
    assert!(title_pos < body_pos, "declarations must keep input order");
}
