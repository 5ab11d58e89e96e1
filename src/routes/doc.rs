use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    account::settings::SettingName,
    dto::{
        account::{
            AccountExport, AddressList, AddressRequest, ChangePasswordRequest,
            DeleteAccountRequest, DeletionNotice, ProfileForm, ProfileView, ToggleSettingRequest,
        },
        auth::{CurrentUser, LoginRequest, LoginResponse, LogoutRequest, RegisterRequest},
        categories::{CategoryDetail, CategoryList, ProductListing},
    },
    models::{Address, AddressType, Category, Product, ProductFlavor, Settings, User, UserProfile},
    response::{ApiResponse, Meta},
    routes::{account, auth, categories, health},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        account::get_profile,
        account::save_profile,
        account::list_addresses,
        account::create_address,
        account::update_address,
        account::delete_address,
        account::set_default_address,
        account::get_settings,
        account::toggle_setting,
        account::change_password,
        account::export_data,
        account::request_deletion,
        categories::list_categories,
        categories::get_category
    ),
    components(
        schemas(
            User,
            UserProfile,
            Address,
            AddressType,
            Settings,
            SettingName,
            Category,
            Product,
            ProductFlavor,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            LogoutRequest,
            CurrentUser,
            ProfileForm,
            ProfileView,
            AddressRequest,
            AddressList,
            ToggleSettingRequest,
            ChangePasswordRequest,
            AccountExport,
            DeleteAccountRequest,
            DeletionNotice,
            CategoryList,
            CategoryDetail,
            ProductListing,
            Meta,
            ApiResponse<ProfileView>,
            ApiResponse<AddressList>,
            ApiResponse<Settings>,
            ApiResponse<CategoryList>,
            ApiResponse<CategoryDetail>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and sign-out"),
        (name = "Account", description = "Profile, addresses, settings and account data"),
        (name = "Categories", description = "Category and product browsing"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
